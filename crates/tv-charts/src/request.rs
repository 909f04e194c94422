//! Chart requests as supplied by the caller

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tv_core::SortOrder;

/// Every supported chart family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartType {
    #[default]
    Bar,
    HorizontalBar,
    StackedBar,
    Line,
    Area,
    Scatter,
    Bubble,
    Box,
    Violin,
    Histogram,
    Pie,
    Donut,
    Heatmap,
    DensityHeatmap,
    Contour,
    Treemap,
    Sunburst,
    Polar,
    Radar,
    Funnel,
    Waterfall,
    ParallelCoordinates,
    ParallelCategories,
    Scatter3d,
    Line3d,
    Surface3d,
    Mesh3d,
}

/// How missing y values are treated before reshaping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Missing numeric values become 0
    FillZero,
    /// Linear interpolation across row order
    Interpolate,
    /// Kept, with a per-row "is missing" indicator
    Indicate,
    /// Missing labels and values become the literal "Missing"
    LabelMissing,
    /// Missing x becomes the literal "Missing"
    LabelMissingX,
    /// Values are passed through as they are
    Keep,
}

impl ChartType {
    pub const ALL: [ChartType; 27] = [
        ChartType::Bar,
        ChartType::HorizontalBar,
        ChartType::StackedBar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Box,
        ChartType::Violin,
        ChartType::Histogram,
        ChartType::Pie,
        ChartType::Donut,
        ChartType::Heatmap,
        ChartType::DensityHeatmap,
        ChartType::Contour,
        ChartType::Treemap,
        ChartType::Sunburst,
        ChartType::Polar,
        ChartType::Radar,
        ChartType::Funnel,
        ChartType::Waterfall,
        ChartType::ParallelCoordinates,
        ChartType::ParallelCategories,
        ChartType::Scatter3d,
        ChartType::Line3d,
        ChartType::Surface3d,
        ChartType::Mesh3d,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::HorizontalBar => "horizontal_bar",
            ChartType::StackedBar => "stacked_bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Box => "box",
            ChartType::Violin => "violin",
            ChartType::Histogram => "histogram",
            ChartType::Pie => "pie",
            ChartType::Donut => "donut",
            ChartType::Heatmap => "heatmap",
            ChartType::DensityHeatmap => "density_heatmap",
            ChartType::Contour => "contour",
            ChartType::Treemap => "treemap",
            ChartType::Sunburst => "sunburst",
            ChartType::Polar => "polar",
            ChartType::Radar => "radar",
            ChartType::Funnel => "funnel",
            ChartType::Waterfall => "waterfall",
            ChartType::ParallelCoordinates => "parallel_coordinates",
            ChartType::ParallelCategories => "parallel_categories",
            ChartType::Scatter3d => "scatter_3d",
            ChartType::Line3d => "line_3d",
            ChartType::Surface3d => "surface_3d",
            ChartType::Mesh3d => "mesh_3d",
        }
    }

    /// Human name used in chart titles
    pub fn display_name(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::HorizontalBar => "Horizontal Bar",
            ChartType::StackedBar => "Stacked Bar",
            ChartType::Line => "Line",
            ChartType::Area => "Area",
            ChartType::Scatter => "Scatter",
            ChartType::Bubble => "Bubble",
            ChartType::Box => "Box",
            ChartType::Violin => "Violin",
            ChartType::Histogram => "Histogram",
            ChartType::Pie => "Pie",
            ChartType::Donut => "Donut",
            ChartType::Heatmap => "Heatmap",
            ChartType::DensityHeatmap => "Density Heatmap",
            ChartType::Contour => "Contour",
            ChartType::Treemap => "Treemap",
            ChartType::Sunburst => "Sunburst",
            ChartType::Polar => "Polar",
            ChartType::Radar => "Radar",
            ChartType::Funnel => "Funnel",
            ChartType::Waterfall => "Waterfall",
            ChartType::ParallelCoordinates => "Parallel Coordinates",
            ChartType::ParallelCategories => "Parallel Categories",
            ChartType::Scatter3d => "3D Scatter",
            ChartType::Line3d => "3D Line",
            ChartType::Surface3d => "3D Surface",
            ChartType::Mesh3d => "3D Mesh",
        }
    }

    /// Strict lookup by snake_case name
    pub fn parse(name: &str) -> Option<ChartType> {
        let name = name.trim().to_lowercase();
        ChartType::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Families taking exactly two numeric y columns
    pub fn needs_two_numeric_y(&self) -> bool {
        matches!(
            self,
            ChartType::Scatter3d
                | ChartType::Line3d
                | ChartType::Mesh3d
                | ChartType::Surface3d
                | ChartType::Bubble
        )
    }

    /// Families that additionally need a numeric x column
    pub fn needs_numeric_x(&self) -> bool {
        matches!(self, ChartType::Mesh3d | ChartType::Surface3d)
    }

    /// Families that can be drawn without any y column
    pub fn y_optional(&self) -> bool {
        matches!(
            self,
            ChartType::Histogram
                | ChartType::Pie
                | ChartType::Donut
                | ChartType::Treemap
                | ChartType::Sunburst
        )
    }

    pub fn missing_policy(&self) -> MissingPolicy {
        match self {
            ChartType::Bar
            | ChartType::Area
            | ChartType::StackedBar
            | ChartType::Polar
            | ChartType::Radar
            | ChartType::HorizontalBar => MissingPolicy::FillZero,
            ChartType::Line => MissingPolicy::Interpolate,
            ChartType::Scatter | ChartType::Box => MissingPolicy::Indicate,
            ChartType::Pie | ChartType::Donut => MissingPolicy::LabelMissing,
            ChartType::Histogram => MissingPolicy::LabelMissingX,
            _ => MissingPolicy::Keep,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised names fall back to a bar chart
impl From<&str> for ChartType {
    fn from(name: &str) -> Self {
        ChartType::parse(name).unwrap_or_else(|| {
            tracing::warn!("Unknown chart type '{}', falling back to bar", name);
            ChartType::Bar
        })
    }
}

impl From<String> for ChartType {
    fn from(name: String) -> Self {
        ChartType::from(name.as_str())
    }
}

impl From<ChartType> for String {
    fn from(chart_type: ChartType) -> Self {
        chart_type.as_str().to_string()
    }
}

impl FromStr for ChartType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ChartType::from(s))
    }
}

/// A desired visualisation over a dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartRequest {
    pub chart_type: ChartType,
    pub x_column: String,
    pub y_columns: Vec<String>,
    pub color_column: Option<String>,
    pub sort_order: SortOrder,
    /// Explicit order of x categories; overrides `sort_order`
    pub custom_category_order: Option<Vec<String>>,
}

impl ChartRequest {
    pub fn new(chart_type: ChartType, x_column: impl Into<String>) -> Self {
        Self {
            chart_type,
            x_column: x_column.into(),
            ..Self::default()
        }
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y_columns.push(column.into());
        self
    }

    pub fn color(mut self, column: impl Into<String>) -> Self {
        self.color_column = Some(column.into());
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn custom_order<S: Into<String>>(mut self, order: impl IntoIterator<Item = S>) -> Self {
        self.custom_category_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Colour column, treating an empty name as absent
    pub fn color_column(&self) -> Option<&str> {
        self.color_column.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Custom order, treating an empty list as absent
    pub fn category_order(&self) -> Option<&[String]> {
        self.custom_category_order.as_deref().filter(|o| !o.is_empty())
    }

    /// y column names joined for titles
    pub fn y_label(&self) -> String {
        self.y_columns.join(", ")
    }
}
