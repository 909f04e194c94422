use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tv_core::events::events::DatasetStored;
use tv_core::{CoreError, Dataset, EventBus, Result};

use super::DatasetId;
use crate::cache::BoundedCache;

/// Raw uploaded datasets keyed by id.
///
/// Datasets are never mutated in place; readers receive an `Arc` snapshot
/// that stays valid even if the id is overwritten or evicted afterwards.
pub struct DatasetStore {
    datasets: Mutex<BoundedCache<DatasetId, Arc<Dataset>>>,
    next_id: AtomicU64,
    events: Option<Arc<EventBus>>,
}

impl DatasetStore {
    /// Create a store keeping at most `capacity` datasets (`None` = unbounded)
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            datasets: Mutex::new(BoundedCache::new(capacity)),
            next_id: AtomicU64::new(1),
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Store a dataset under a freshly assigned id
    pub fn put(&self, dataset: Dataset) -> DatasetId {
        let id = DatasetId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.put_at(id.clone(), dataset);
        id
    }

    /// Store a dataset under an existing id, replacing any previous version
    pub fn put_at(&self, id: DatasetId, dataset: Dataset) {
        let rows = dataset.num_rows();
        let columns = dataset.num_columns();

        if let Some(evicted) = self.datasets.lock().insert(id.clone(), Arc::new(dataset)) {
            tracing::debug!("Evicted dataset {} to stay within capacity", evicted);
        }
        tracing::info!("Stored dataset {} ({} rows x {} columns)", id, rows, columns);

        if let Some(events) = &self.events {
            events.publish(DatasetStored {
                dataset_id: id.to_string(),
                row_count: rows,
                column_count: columns,
            });
        }
    }

    pub fn get(&self, id: &DatasetId) -> Result<Arc<Dataset>> {
        self.datasets
            .lock()
            .get(id)
            .ok_or_else(|| CoreError::DatasetNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &DatasetId) -> bool {
        self.datasets.lock().contains(id)
    }

    /// Ids currently held, least recently used first
    pub fn ids(&self) -> Vec<DatasetId> {
        self.datasets.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.datasets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.lock().is_empty()
    }

    pub fn clear(&self) {
        self.datasets.lock().clear();
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array};

    fn dataset(values: Vec<i64>) -> Dataset {
        Dataset::from_columns(vec![("v", Arc::new(Int64Array::from(values)) as ArrayRef)]).unwrap()
    }

    #[test]
    fn test_get_after_put_returns_same_dataset() {
        let store = DatasetStore::default();
        let ds = dataset(vec![1, 2, 3]);
        let id = store.put(ds.clone());
        assert_eq!(*store.get(&id).unwrap(), ds);
    }

    #[test]
    fn test_ids_are_unique_and_sequential() {
        let store = DatasetStore::default();
        let a = store.put(dataset(vec![1]));
        let b = store.put(dataset(vec![2]));
        assert_eq!(a.as_str(), "1");
        assert_eq!(b.as_str(), "2");

        store.clear();
        let c = store.put(dataset(vec![3]));
        assert_eq!(c.as_str(), "3");
    }

    #[test]
    fn test_concurrent_puts_do_not_collide() {
        let store = Arc::new(DatasetStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.put(dataset(vec![i])))
            })
            .collect();
        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_missing_id() {
        let store = DatasetStore::default();
        let err = store.get(&DatasetId::from("42")).unwrap_err();
        assert!(matches!(err, CoreError::DatasetNotFound(id) if id == "42"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = DatasetStore::new(Some(1));
        let first = store.put(dataset(vec![1]));
        let second = store.put(dataset(vec![2]));
        assert!(!store.contains(&first));
        assert!(store.contains(&second));
    }

    #[test]
    fn test_put_at_overwrites() {
        let store = DatasetStore::default();
        let id = DatasetId::from("session-a");
        store.put_at(id.clone(), dataset(vec![1]));
        store.put_at(id.clone(), dataset(vec![1, 2]));
        assert_eq!(store.get(&id).unwrap().num_rows(), 2);
        assert_eq!(store.ids(), vec![id]);
    }
}
