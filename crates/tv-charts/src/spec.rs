//! Validated, reshaped chart descriptions handed to a rendering backend

use serde::Serialize;
use tv_core::Cell;

use crate::request::ChartType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub layout: Layout,
    pub data: ChartData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
    Stack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Axis and legend metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub x_title: String,
    pub y_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    pub show_legend: bool,
    /// Order of categories on the x axis when set explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    pub orientation: Orientation,
}

/// One y column after the missing-value policy was applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Cell>,
}

/// Role of a waterfall step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMeasure {
    Relative,
    Total,
}

/// One axis of a parallel coordinates/categories chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub label: String,
    pub values: Vec<Cell>,
    /// Observed `[min, max]` of a numeric dimension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    /// Observed categories of a non-numeric dimension, sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    /// Row-wise data: one x value per row and one value per row in each series
    Rows {
        x: Vec<Cell>,
        series: Vec<Series>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Vec<Cell>>,
        /// Whether the first series was missing in each row
        #[serde(skip_serializing_if = "Option::is_none")]
        is_missing: Option<Vec<bool>>,
    },
    /// Row counts per (x, y) pair; `counts[i][j]` belongs to `x_labels[i]`, `y_labels[j]`
    Matrix {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    },
    /// Regular grid; `z[j][i]` is the value at (`x[i]`, `y[j]`), NaN outside the data hull
    Surface {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<Vec<f64>>,
    },
    /// Flattened vertices of a triangulated mesh
    Mesh { x: Vec<f64>, y: Vec<f64>, z: Vec<f64> },
    /// Row-wise points in three dimensions
    Points3d {
        x: Vec<Cell>,
        y: Vec<Cell>,
        z: Vec<Cell>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Vec<Cell>>,
    },
    /// Aggregated steps of a funnel or waterfall
    Steps {
        labels: Vec<String>,
        values: Vec<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        measures: Option<Vec<StepMeasure>>,
    },
    Dimensions {
        dimensions: Vec<Dimension>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Vec<Cell>>,
    },
}

impl ChartData {
    /// Values of the named series for row-wise data
    pub fn series(&self, name: &str) -> Option<&[Cell]> {
        match self {
            ChartData::Rows { series, .. } => series
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.values.as_slice()),
            _ => None,
        }
    }

    /// x values for row-wise data
    pub fn x(&self) -> Option<&[Cell]> {
        match self {
            ChartData::Rows { x, .. } | ChartData::Points3d { x, .. } => Some(x),
            _ => None,
        }
    }
}
