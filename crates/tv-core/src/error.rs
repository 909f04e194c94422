//! Error taxonomy shared by the filter engine and the chart dispatcher

use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Boxed underlying cause of a reshape failure
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while filtering datasets or building chart specs
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    #[error("column '{column}' not found. Available columns: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("operator '{0}' not allowed")]
    UnsupportedOperator(String),

    #[error("{chart} chart: {reason}")]
    ChartArity { chart: String, reason: String },

    #[error("error generating {chart} chart: {source}")]
    Reshape {
        chart: String,
        #[source]
        source: BoxedCause,
    },

    #[error("filter persistence failed for {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn unknown_column(column: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            available,
        }
    }

    pub fn arity(chart: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ChartArity {
            chart: chart.into(),
            reason: reason.into(),
        }
    }

    pub fn reshape(chart: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        Self::Reshape {
            chart: chart.into(),
            source: cause.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Validation errors are raised before any data is transformed
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownColumn { .. } | Self::UnsupportedOperator(_) | Self::ChartArity { .. }
        )
    }
}
