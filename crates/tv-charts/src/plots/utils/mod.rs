//! Geometry and statistics helpers for the reshape functions

pub mod delaunay;
pub mod interpolate;
pub mod stats;

pub use interpolate::{CubicInterpolator, InterpolationError};
pub use stats::{linspace, mean_by_pair, numeric_range, sorted_labels};
