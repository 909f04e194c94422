//! Chart spec dispatcher
//!
//! Validates a [`ChartRequest`] against a dataset, orders its rows, applies
//! the chart family's missing-value policy and reshapes the data into a
//! backend-neutral [`ChartSpec`].

pub mod builder;
pub mod missing;
pub mod ordering;
pub mod plots;
pub mod request;
pub mod spec;
pub mod validate;

// Re-exports
pub use builder::{build, ChartBuilder, MISSING_LEGEND};
pub use missing::MISSING_LABEL;
pub use plots::utils::{CubicInterpolator, InterpolationError};
pub use request::{ChartRequest, ChartType, MissingPolicy};
pub use spec::{BarMode, ChartData, ChartSpec, Dimension, Layout, Orientation, Series, StepMeasure};
