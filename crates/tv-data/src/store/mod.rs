//! Process-wide stores: raw datasets keyed by id and the global filter set

pub mod dataset_store;
pub mod filter_store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use dataset_store::DatasetStore;
pub use filter_store::{FilterBackend, FilterSetStore, JsonFileBackend, MemoryBackend};

/// Opaque dataset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DatasetId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<u64> for DatasetId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for DatasetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
