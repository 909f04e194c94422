//! Reshape functions, one per chart family
//!
//! Every function receives the columns of an already validated and ordered
//! dataset and produces the [`ChartData`](crate::spec::ChartData) variant its
//! family renders from.

// Row-wise 2D families
pub mod series;

// Aggregating families
pub mod funnel;
pub mod heatmap;

// Multi-dimensional families
pub mod parallel;

// 3D families
pub mod mesh3d;
pub mod scatter3d;
pub mod surface3d;

// Utilities
pub mod utils;

use tv_core::error::BoxedCause;
use tv_core::{Cell, ColumnKind, CoreError, Dataset, Result};

use crate::request::{ChartRequest, ChartType};

/// A dataset column pulled out as cells
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn read(dataset: &Dataset, name: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            kind: dataset.kind(name)?,
            cells: dataset.cells(name)?,
        })
    }

    /// Numeric values, missing cells as `None`; fails on any other non-numeric cell
    pub fn numbers(&self, chart: ChartType) -> Result<Vec<Option<f64>>> {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Missing => Ok(None),
                other => other.as_f64().map(Some).ok_or_else(|| {
                    reshape_error(
                        chart,
                        format!("column '{}' must be numeric, found {:?}", self.name, other),
                    )
                }),
            })
            .collect()
    }
}

/// Columns referenced by a request, in the order rows were arranged
#[derive(Debug, Clone)]
pub struct PlotInput {
    pub chart: ChartType,
    pub x: Column,
    pub ys: Vec<Column>,
    pub color: Option<Column>,
}

impl PlotInput {
    pub fn gather(dataset: &Dataset, request: &ChartRequest) -> Result<Self> {
        Ok(Self {
            chart: request.chart_type,
            x: Column::read(dataset, &request.x_column)?,
            ys: request
                .y_columns
                .iter()
                .map(|name| Column::read(dataset, name))
                .collect::<Result<_>>()?,
            color: request
                .color_column()
                .map(|name| Column::read(dataset, name))
                .transpose()?,
        })
    }

    pub fn first_y(&self) -> Option<&Column> {
        self.ys.first()
    }

    /// First y column, failing when the family needs one and none was given
    pub fn require_y(&self) -> Result<&Column> {
        self.first_y()
            .ok_or_else(|| CoreError::arity(self.chart.as_str(), "requires at least one y column"))
    }

    pub fn color_cells(&self) -> Option<Vec<Cell>> {
        self.color.as_ref().map(|c| c.cells.clone())
    }
}

/// Wrap a reshape failure with the chart family it happened in
pub(crate) fn reshape_error(chart: ChartType, cause: impl Into<BoxedCause>) -> CoreError {
    CoreError::reshape(chart.as_str(), cause)
}
