use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use std::collections::HashSet;

use tv_core::parse_datetime_millis;

use crate::config::NullConfig;

/// Schema detector for analyzing raw text columns and determining their types
pub struct SchemaDetector {
    sample_size: usize,
    nulls: NullConfig,
}

/// Statistics about a column gathered during detection
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub null_count: usize,
    pub distinct_count: usize,
}

impl SchemaDetector {
    /// Create a new schema detector
    pub fn new(nulls: NullConfig) -> Self {
        Self {
            sample_size: 1000,
            nulls,
        }
    }

    /// Set the sample size for detection
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    pub fn nulls(&self) -> &NullConfig {
        &self.nulls
    }

    /// Detect a schema from the first `sample_size` rows of raw text values
    pub fn detect(&self, headers: &[String], rows: &[Vec<String>]) -> Schema {
        let samples = &rows[..rows.len().min(self.sample_size)];
        let fields = headers
            .iter()
            .enumerate()
            .map(|(col_idx, header)| {
                let (data_type, stats) = self.analyze_column(samples, col_idx);
                tracing::debug!(
                    "Column '{}' detected as {:?} ({} nulls, {} distinct in sample)",
                    header,
                    data_type,
                    stats.null_count,
                    stats.distinct_count
                );
                Field::new(header, data_type, true)
            })
            .collect::<Vec<_>>();
        Schema::new(fields)
    }

    /// Analyze a single column
    fn analyze_column(&self, samples: &[Vec<String>], col_idx: usize) -> (DataType, ColumnStats) {
        let mut null_count = 0;
        let mut distinct = HashSet::new();
        let mut is_int = true;
        let mut is_float = true;
        let mut is_timestamp = true;
        let mut is_bool = true;

        for row in samples {
            let value = match row.get(col_idx) {
                Some(value) if !self.nulls.is_null(value) => value.trim(),
                _ => {
                    null_count += 1;
                    continue;
                }
            };
            distinct.insert(value.to_string());

            if is_int && value.parse::<i64>().is_err() {
                is_int = false;
            }
            if is_float && value.parse::<f64>().is_err() {
                is_float = false;
            }
            if is_bool && !matches!(value.to_lowercase().as_str(), "true" | "false") {
                is_bool = false;
            }
            if is_timestamp && (is_float || parse_datetime_millis(value).is_none()) {
                is_timestamp = false;
            }
        }

        // A column with no values at all stays text
        let data_type = if distinct.is_empty() {
            DataType::Utf8
        } else if is_bool {
            DataType::Boolean
        } else if is_int {
            DataType::Int64
        } else if is_float {
            DataType::Float64
        } else if is_timestamp {
            DataType::Timestamp(TimeUnit::Millisecond, None)
        } else {
            DataType::Utf8
        };

        let stats = ColumnStats {
            null_count,
            distinct_count: distinct.len(),
        };

        (data_type, stats)
    }
}

impl Default for SchemaDetector {
    fn default() -> Self {
        Self::new(NullConfig::default())
    }
}
