use std::sync::Arc;

use serde_json::Value;
use tv_core::Dataset;

use super::csv_source::build_dataset;
use crate::schema::SchemaDetector;
use crate::DataError;

/// JSON source accepting either an array of records or an object of
/// equally long column arrays
pub struct JsonSource {
    detector: SchemaDetector,
}

impl JsonSource {
    pub fn new(detector: SchemaDetector) -> Self {
        Self { detector }
    }

    pub fn read(&self, bytes: &[u8]) -> Result<Dataset, DataError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let (headers, rows) = match value {
            Value::Array(records) => Self::from_records(records)?,
            Value::Object(columns) => Self::from_columns(columns)?,
            _ => {
                return Err(DataError::Json(
                    "expected an array of records or an object of columns".to_string(),
                ))
            }
        };

        tracing::info!("Parsed {} JSON records with {} columns", rows.len(), headers.len());
        let schema = self.detector.detect(&headers, &rows);
        build_dataset(Arc::new(schema), &rows, self.detector.nulls())
    }

    fn from_records(records: Vec<Value>) -> Result<(Vec<String>, Vec<Vec<String>>), DataError> {
        // Column order is the order of first appearance across records
        let mut headers: Vec<String> = Vec::new();
        for record in &records {
            let object = record
                .as_object()
                .ok_or_else(|| DataError::Json("every record must be an object".to_string()))?;
            for key in object.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map(scalar_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok((headers, rows))
    }

    fn from_columns(
        columns: serde_json::Map<String, Value>,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), DataError> {
        let headers: Vec<String> = columns.keys().cloned().collect();
        let arrays = columns
            .values()
            .map(|v| {
                v.as_array()
                    .ok_or_else(|| DataError::Json("every column must be an array".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let row_count = arrays.iter().map(|a| a.len()).max().unwrap_or(0);
        let rows = (0..row_count)
            .map(|i| {
                arrays
                    .iter()
                    .map(|a| a.get(i).map(scalar_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok((headers, rows))
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
