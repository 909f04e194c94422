//! Entry point of the chart dispatcher: validate, order, reshape, then describe

use tracing::{debug, info};
use tv_core::{Dataset, EngineConfig, Result};

use crate::ordering::order_rows;
use crate::plots::{funnel, heatmap, mesh3d, parallel, scatter3d, series, surface3d, PlotInput};
use crate::request::{ChartRequest, ChartType, MissingPolicy};
use crate::spec::{BarMode, ChartData, ChartSpec, Layout, Orientation};
use crate::validate::validate;

/// Legend shown when rows are coloured by the derived missing-value indicator
pub const MISSING_LEGEND: &str = "Missing Values";

const DEFAULT_SURFACE_RESOLUTION: usize = 100;

/// Turns a dataset and a [`ChartRequest`] into a [`ChartSpec`].
///
/// Validation runs before anything is transformed, so a rejected request
/// never yields a partial spec.
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    surface_resolution: usize,
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self {
            surface_resolution: DEFAULT_SURFACE_RESOLUTION,
        }
    }
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::default().with_surface_resolution(config.surface_grid_size)
    }

    /// Number of grid nodes per axis for 3D surfaces (at least 2)
    pub fn with_surface_resolution(mut self, resolution: usize) -> Self {
        self.surface_resolution = resolution.max(2);
        self
    }

    pub fn surface_resolution(&self) -> usize {
        self.surface_resolution
    }

    pub fn build(&self, dataset: &Dataset, request: &ChartRequest) -> Result<ChartSpec> {
        validate(dataset, request)?;

        let ordered = order_rows(dataset, request)?;
        let input = PlotInput::gather(&ordered, request)?;

        let data = match request.chart_type {
            ChartType::Heatmap => heatmap::counts(&input)?,
            ChartType::Surface3d => surface3d::surface(&input, self.surface_resolution)?,
            ChartType::Mesh3d => mesh3d::mesh(&input)?,
            ChartType::Scatter3d | ChartType::Line3d => scatter3d::points(&input)?,
            ChartType::Funnel => funnel::funnel(&input)?,
            ChartType::Waterfall => funnel::waterfall(&input)?,
            ChartType::ParallelCoordinates | ChartType::ParallelCategories => parallel::dimensions(&input)?,
            ChartType::Bar
            | ChartType::HorizontalBar
            | ChartType::StackedBar
            | ChartType::Line
            | ChartType::Area
            | ChartType::Scatter
            | ChartType::Bubble
            | ChartType::Box
            | ChartType::Violin
            | ChartType::Histogram
            | ChartType::Pie
            | ChartType::Donut
            | ChartType::DensityHeatmap
            | ChartType::Contour
            | ChartType::Treemap
            | ChartType::Sunburst
            | ChartType::Polar
            | ChartType::Radar => series::rows(&input)?,
        };

        let spec = ChartSpec {
            chart_type: request.chart_type,
            title: title(request),
            layout: layout(request, &data),
            data,
        };

        info!("Built {} chart over {} rows", request.chart_type, ordered.num_rows());
        debug!("Chart layout: {:?}", spec.layout);
        Ok(spec)
    }
}

/// Build with the default settings
pub fn build(dataset: &Dataset, request: &ChartRequest) -> Result<ChartSpec> {
    ChartBuilder::default().build(dataset, request)
}

fn first_y(request: &ChartRequest) -> Option<&str> {
    request.y_columns.first().map(String::as_str)
}

pub fn title(request: &ChartRequest) -> String {
    let x = &request.x_column;
    let chart = request.chart_type;
    match chart {
        ChartType::Histogram => format!("Histogram Chart for {}", x),
        ChartType::Heatmap => format!("Heatmap for {} vs {}", x, first_y(request).unwrap_or_default()),
        ChartType::Pie | ChartType::Donut => match first_y(request) {
            Some(y) => format!("{} Chart for {} by {}", chart.display_name(), y, x),
            None => format!("{} Chart for {}", chart.display_name(), x),
        },
        _ => {
            let mut title = if request.y_columns.is_empty() {
                format!("{} Chart for {}", chart.display_name(), x)
            } else {
                format!("{} Chart for {} by {}", chart.display_name(), request.y_label(), x)
            };
            if let Some(color) = request.color_column() {
                title.push_str(&format!(" grouped by {}", color));
            }
            title
        }
    }
}

fn layout(request: &ChartRequest, data: &ChartData) -> Layout {
    let chart = request.chart_type;
    let x = request.x_column.clone();

    let y_title = match chart {
        ChartType::Histogram => "Count".to_string(),
        ChartType::Heatmap | ChartType::Pie | ChartType::Donut => {
            first_y(request).unwrap_or_default().to_string()
        }
        _ if chart.needs_two_numeric_y() => first_y(request).unwrap_or_default().to_string(),
        _ => request.y_label(),
    };

    let z_title = match chart {
        ChartType::Scatter3d | ChartType::Line3d | ChartType::Surface3d | ChartType::Mesh3d => {
            request.y_columns.get(1).cloned()
        }
        _ => None,
    };

    let legend_title = match request.color_column() {
        Some(color) => Some(color.to_string()),
        None if chart.missing_policy() == MissingPolicy::Indicate => Some(MISSING_LEGEND.to_string()),
        None => None,
    };

    let series_count = match data {
        ChartData::Rows { series, .. } => series.len(),
        _ => 1,
    };

    let bar_mode = match chart {
        ChartType::StackedBar => Some(BarMode::Stack),
        ChartType::Bar | ChartType::HorizontalBar if request.y_columns.len() > 1 => Some(BarMode::Group),
        _ => None,
    };

    let (x_title, y_title, orientation) = if chart == ChartType::HorizontalBar {
        (y_title, x, Orientation::Horizontal)
    } else {
        (x, y_title, Orientation::Vertical)
    };

    Layout {
        x_title,
        y_title,
        z_title,
        show_legend: legend_title.is_some() || series_count > 1,
        legend_title,
        category_order: request.category_order().map(<[String]>::to_vec),
        bar_mode,
        orientation,
    }
}
