use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tv_core::SortOrder;

/// Command-line arguments for tabviz
#[derive(Parser, Debug)]
#[command(version, about = "Filter tabular data and describe charts over it")]
pub struct Args {
    /// Engine configuration file (JSON)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a chart spec and print it as JSON
    Chart {
        #[command(flatten)]
        source: Source,

        /// Chart family, e.g. bar, line, surface_3d
        #[arg(long = "type", default_value = "bar")]
        chart_type: String,

        #[arg(long = "x")]
        x_column: String,

        /// y column; repeat for several
        #[arg(long = "y")]
        y_columns: Vec<String>,

        #[arg(long = "color")]
        color_column: Option<String>,

        #[arg(long = "sort", value_enum, default_value_t = Direction::Asc)]
        sort: Direction,

        /// Explicit category order for the x axis, comma separated
        #[arg(long = "order", value_delimiter = ',')]
        order: Vec<String>,
    },

    /// Print one page of the filtered data grid as JSON
    Grid {
        #[command(flatten)]
        source: Source,

        #[arg(long = "start", default_value_t = 0)]
        start: usize,

        #[arg(long = "length", default_value_t = 10)]
        length: usize,

        /// Case-insensitive text searched in every cell
        #[arg(long = "search")]
        search: Option<String>,

        /// Index of the column to sort by
        #[arg(long = "sort-column")]
        sort_column: Option<usize>,

        #[arg(long = "sort", value_enum, default_value_t = Direction::Asc)]
        sort: Direction,
    },

    /// Describe the shape and column types of a file
    Overview {
        file: PathBuf,

        /// Also print the first rows as a table
        #[arg(long = "preview", action)]
        preview: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct Source {
    /// Data file (.csv, .tsv or .json)
    pub file: PathBuf,

    /// JSON file with filter conditions applied on top of the upload
    #[arg(long = "filters")]
    pub filters: Option<PathBuf>,

    /// Keep rows with missing values and the original column names
    #[arg(long = "raw", action)]
    pub raw: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortOrder {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => SortOrder::Asc,
            Direction::Desc => SortOrder::Desc,
        }
    }
}
