//! Summary of an uploaded dataset shown after ingestion

use indexmap::IndexMap;
use serde::Serialize;
use tv_core::{ColumnKind, Dataset};

/// Shape and schema of a dataset plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub file_name: String,
    pub data_format: String,
    pub columns: usize,
    pub rows: usize,
    pub column_names: Vec<String>,
    /// Kind per column, in column order
    pub column_types: IndexMap<String, ColumnKind>,
    pub numeric_columns: Vec<String>,
}

impl DatasetOverview {
    pub fn new(dataset: &Dataset, file_name: impl Into<String>, data_format: impl Into<String>) -> Self {
        let column_types: IndexMap<String, ColumnKind> = dataset.kinds().into_iter().collect();
        let numeric_columns = column_types
            .iter()
            .filter(|(_, kind)| kind.is_numeric())
            .map(|(name, _)| name.clone())
            .collect();

        Self {
            file_name: file_name.into(),
            data_format: data_format.into(),
            columns: dataset.num_columns(),
            rows: dataset.num_rows(),
            column_names: dataset.column_names(),
            column_types,
            numeric_columns,
        }
    }

    /// `"3 Columns, 120 Rows"`
    pub fn shape_label(&self) -> String {
        format!("{} Columns, {} Rows", self.columns, self.rows)
    }
}
