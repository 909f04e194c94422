use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tv_core::events::events::FiltersReplaced;
use tv_core::{CoreError, EventBus, Result};

use crate::filter::FilterSet;

/// Durable location of the filter set
pub trait FilterBackend: Send + Sync {
    /// Persisted set, `None` if nothing has been written yet
    fn read(&self) -> Result<Option<FilterSet>>;

    /// Overwrite the persisted set
    fn write(&self, filters: &FilterSet) -> Result<()>;
}

/// Filter set stored as a JSON array of `{column, operator, value}` records
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FilterBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<FilterSet>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::persistence(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CoreError::persistence(&self.path, e.into()))
    }

    fn write(&self, filters: &FilterSet) -> Result<()> {
        let json = serde_json::to_string_pretty(filters)
            .map_err(|e| CoreError::persistence(&self.path, e.into()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CoreError::persistence(parent, e))?;
        }

        // Write beside the target then rename so readers never see a torn file
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| CoreError::persistence(&staging, e))?;
        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            CoreError::persistence(&self.path, e)
        })
    }
}

/// Non-durable backend, mainly for tests and embedding
#[derive(Default)]
pub struct MemoryBackend {
    filters: RwLock<Option<FilterSet>>,
}

impl FilterBackend for MemoryBackend {
    fn read(&self) -> Result<Option<FilterSet>> {
        Ok(self.filters.read().clone())
    }

    fn write(&self, filters: &FilterSet) -> Result<()> {
        *self.filters.write() = Some(filters.clone());
        Ok(())
    }
}

/// The single, process-wide filter set.
///
/// Writes are serialised; the last writer wins and sets are never merged.
pub struct FilterSetStore {
    backend: Box<dyn FilterBackend>,
    write_lock: Mutex<()>,
    events: Option<Arc<EventBus>>,
}

impl FilterSetStore {
    pub fn new(backend: Box<dyn FilterBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            events: None,
        }
    }

    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(JsonFileBackend::new(path)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current filter set. Unreadable or absent persisted state yields an
    /// empty set.
    pub fn load(&self) -> FilterSet {
        match self.backend.read() {
            Ok(filters) => filters.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load filter set, using none: {}", e);
                FilterSet::new()
            }
        }
    }

    /// Persist `filters` as the whole set, overwriting any prior set
    pub fn replace(&self, filters: FilterSet) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.persist(&filters)
    }

    pub fn clear(&self) -> Result<()> {
        self.replace(FilterSet::new())
    }

    /// Append conditions to the persisted set, returning the combined set
    pub fn append(&self, more: FilterSet) -> Result<FilterSet> {
        let _guard = self.write_lock.lock();
        let mut filters = self.load();
        filters.extend(more);
        self.persist(&filters)?;
        Ok(filters)
    }

    fn persist(&self, filters: &FilterSet) -> Result<()> {
        self.backend.write(filters)?;
        tracing::info!("Filter set replaced with {} conditions", filters.len());
        if let Some(events) = &self.events {
            events.publish(FiltersReplaced {
                condition_count: filters.len(),
            });
        }
        Ok(())
    }
}
