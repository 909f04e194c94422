//! Column arity and type checks performed before any reshaping

use tv_core::{CoreError, Dataset, Result};

use crate::request::ChartRequest;

/// Check that every referenced column exists and that the chart family's
/// arity and type requirements hold
pub fn validate(dataset: &Dataset, request: &ChartRequest) -> Result<()> {
    let chart = request.chart_type;

    dataset.require_column(&request.x_column)?;
    for column in &request.y_columns {
        dataset.require_column(column)?;
    }
    if let Some(color) = request.color_column() {
        dataset.require_column(color)?;
    }

    if request.y_columns.is_empty() && !chart.y_optional() {
        return Err(CoreError::arity(chart.as_str(), "requires at least one y column"));
    }

    if chart.needs_two_numeric_y() {
        if request.y_columns.len() != 2 {
            return Err(CoreError::arity(
                chart.as_str(),
                format!("requires exactly 2 y columns, got {}", request.y_columns.len()),
            ));
        }
        for column in &request.y_columns {
            if !dataset.kind(column)?.is_numeric() {
                return Err(CoreError::arity(
                    chart.as_str(),
                    format!("y column '{}' must be numeric", column),
                ));
            }
        }
    }

    if chart.needs_numeric_x() && !dataset.kind(&request.x_column)?.is_numeric() {
        return Err(CoreError::arity(
            chart.as_str(),
            format!("x column '{}' must be numeric", request.x_column),
        ));
    }

    Ok(())
}
