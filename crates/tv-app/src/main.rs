//! Command-line entry point: load a file, apply filters, print chart specs,
//! grid pages or an overview as JSON

mod cli;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tv_charts::{ChartBuilder, ChartRequest, ChartType};
use tv_core::events::events::CoercionFallback;
use tv_core::{Dataset, EngineConfig, EventBus};
use tv_data::sources::read_dataset_with;
use tv_data::{clean, DatasetId, DatasetOverview, FilterSet, FilteredViews, GridQuery, NullConfig};

use cli::{Args, Command, Source};

const PREVIEW_ROWS: usize = 10;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = EngineConfig::load(args.config.as_deref()).context("loading configuration")?;

    match args.command {
        Command::Chart {
            source,
            chart_type,
            x_column,
            y_columns,
            color_column,
            sort,
            order,
        } => {
            let (views, id) = open(&config, &source)?;
            let dataset = views.get(&id)?;

            let mut request = ChartRequest::new(ChartType::from(chart_type.as_str()), x_column).sort(sort.into());
            request.y_columns = y_columns;
            request.color_column = color_column;
            if !order.is_empty() {
                request = request.custom_order(order);
            }

            let spec = ChartBuilder::from_config(&config).build(&dataset, &request)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }

        Command::Grid {
            source,
            start,
            length,
            search,
            sort_column,
            sort,
        } => {
            let (views, id) = open(&config, &source)?;
            let query = GridQuery {
                start,
                length,
                search,
                order: sort_column.map(|column| (column, sort.into())),
            };
            let page = query.run_on(&views, &id);
            if let Some(error) = &page.error {
                warn!("Grid query failed: {}", error);
            }
            println!("{}", serde_json::to_string_pretty(&page)?);
        }

        Command::Overview { file, preview } => {
            let dataset = load(&config, &file, true)?;
            let overview = DatasetOverview::new(&dataset, file_name(&file), extension(&file).to_uppercase());
            info!("{}", overview.shape_label());
            println!("{}", serde_json::to_string_pretty(&overview)?);

            if preview {
                let head = dataset.batch().slice(0, dataset.num_rows().min(PREVIEW_ROWS));
                println!("{}", pretty_format_batches(&[head])?);
            }
        }
    }

    Ok(())
}

/// Upload the file into fresh views and apply the optional filter file
fn open(config: &EngineConfig, source: &Source) -> Result<(FilteredViews, DatasetId)> {
    let events = Arc::new(EventBus::new());
    let fallbacks = Arc::new(AtomicUsize::new(0));
    {
        let fallbacks = fallbacks.clone();
        events.subscribe_fn::<CoercionFallback, _>(move |_| {
            fallbacks.fetch_add(1, Ordering::Relaxed);
        });
    }

    let views = FilteredViews::from_config(config, events);
    let id = views.ingest(load(config, &source.file, !source.raw)?)?;

    if let Some(path) = &source.filters {
        let text = fs::read_to_string(path).with_context(|| format!("reading filters from {}", path.display()))?;
        let filters: FilterSet = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        info!("Applying {} filter conditions from {}", filters.len(), path.display());
        views.append_filters(filters, Some(&id))?;
    }

    let count = fallbacks.load(Ordering::Relaxed);
    if count > 0 {
        warn!("{} filter values were compared without type coercion", count);
    }
    Ok((views, id))
}

fn load(config: &EngineConfig, path: &Path, cleaned: bool) -> Result<Dataset> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let dataset = read_dataset_with(&bytes, extension(path), &NullConfig::from_config(config))
        .with_context(|| format!("parsing {}", path.display()))?;
    if cleaned {
        Ok(clean(&dataset)?)
    } else {
        Ok(dataset)
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
