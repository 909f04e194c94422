//! Core functionality for the tabular visualization engine
//!
//! This crate provides the shared data model (datasets, cells, column kinds),
//! the error taxonomy, the diagnostic event bus and engine configuration.

pub mod cell;
pub mod config;
pub mod dataset;
pub mod error;
pub mod events;

// Re-export commonly used types
pub use cell::{parse_datetime_millis, Cell, SortOrder};
pub use config::EngineConfig;
pub use dataset::{ColumnKind, Dataset};
pub use error::{CoreError, Result};
pub use events::{handler_from_fn, Event, EventBus, EventHandler};
