//! Data handling for the visualization engine: ingestion, stores, filtering
//! and filtered views

pub mod cache;
pub mod cleaning;
pub mod config;
pub mod filter;
pub mod grid;
pub mod overview;
pub mod schema;
pub mod sources;
pub mod store;
pub mod view;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use cache::BoundedCache;
pub use cleaning::clean;
pub use config::NullConfig;
pub use filter::{apply, FilterCondition, FilterEvaluator, FilterOperator, FilterSet, FilterValue};
pub use grid::{GridPage, GridQuery};
pub use overview::DatasetOverview;
pub use sources::read_dataset;
pub use store::{DatasetId, DatasetStore, FilterSetStore};
pub use view::FilteredViews;

/// Errors that can occur while ingesting a dataset
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("JSON parsing error: {0}")]
    Json(String),

    #[error("Schema detection error: {0}")]
    SchemaDetection(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::Json(error.to_string())
    }
}

impl From<tv_core::CoreError> for DataError {
    fn from(error: tv_core::CoreError) -> Self {
        match error {
            tv_core::CoreError::Arrow(e) => DataError::Arrow(e),
            other => DataError::SchemaDetection(other.to_string()),
        }
    }
}
