//! Engine configuration loaded from an optional JSON file and the environment

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const ENV_FILTER_FILE: &str = "TABVIZ_FILTER_FILE";
pub const ENV_DATASET_CAPACITY: &str = "TABVIZ_DATASET_CAPACITY";
pub const ENV_VIEW_CAPACITY: &str = "TABVIZ_VIEW_CAPACITY";
pub const ENV_SURFACE_GRID: &str = "TABVIZ_SURFACE_GRID";

/// Settings shared by the stores, the ingestion layer and the chart dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the global filter set is persisted
    pub filter_file: PathBuf,

    /// Maximum number of raw datasets kept in memory (unbounded if `None`)
    pub dataset_capacity: Option<usize>,

    /// Maximum number of filtered views kept in memory (unbounded if `None`)
    pub view_capacity: Option<usize>,

    /// Resolution of the regular mesh used for 3D surfaces
    pub surface_grid_size: usize,

    /// Text values treated as missing during ingestion
    pub null_patterns: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_file: PathBuf::from("filters.json"),
            dataset_capacity: None,
            view_capacity: None,
            surface_grid_size: 100,
            null_patterns: vec![
                String::new(),
                "-".to_string(),
                "N/A".to_string(),
                "null".to_string(),
                "None".to_string(),
                "NaN".to_string(),
            ],
        }
    }
}

impl EngineConfig {
    /// Read a configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CoreError::persistence(path, e))?;
        serde_json::from_str(&text).map_err(|e| CoreError::persistence(path, e.into()))
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `TABVIZ_*` environment variables on top of this configuration.
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(ENV_FILTER_FILE) {
            self.filter_file = PathBuf::from(path);
        }
        if let Some(capacity) = parse_override(&lookup, ENV_DATASET_CAPACITY) {
            self.dataset_capacity = Some(capacity);
        }
        if let Some(capacity) = parse_override(&lookup, ENV_VIEW_CAPACITY) {
            self.view_capacity = Some(capacity);
        }
        if let Some(size) = parse_override(&lookup, ENV_SURFACE_GRID) {
            self.surface_grid_size = size;
        }
        self
    }
}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!("Ignoring invalid value '{}' for {}", raw, key);
            None
        }
    }
}
