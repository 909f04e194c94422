use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use csv::ReaderBuilder;
use tv_core::{parse_datetime_millis, Dataset};

use crate::config::NullConfig;
use crate::schema::SchemaDetector;
use crate::DataError;

/// Delimited text (CSV/TSV) source
pub struct CsvSource {
    delimiter: u8,
    detector: SchemaDetector,
}

impl CsvSource {
    pub fn new(delimiter: u8, detector: SchemaDetector) -> Self {
        Self { delimiter, detector }
    }

    pub fn comma(detector: SchemaDetector) -> Self {
        Self::new(b',', detector)
    }

    pub fn tab(detector: SchemaDetector) -> Self {
        Self::new(b'\t', detector)
    }

    /// Parse a complete file held in memory
    pub fn read(&self, bytes: &[u8]) -> Result<Dataset, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() {
            return Err(DataError::SchemaDetection("file has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        tracing::info!("Parsed {} rows x {} columns of delimited text", rows.len(), headers.len());
        let schema = self.detector.detect(&headers, &rows);
        build_dataset(Arc::new(schema), &rows, self.detector.nulls())
    }
}

/// Build typed arrow arrays for each column from raw text rows.
///
/// The schema is detected from a sample, so a column whose later values do
/// not parse as its detected type is widened (integer to float, anything to
/// text) rather than losing those values.
pub(crate) fn build_dataset(
    schema: Arc<Schema>,
    rows: &[Vec<String>],
    nulls: &NullConfig,
) -> Result<Dataset, DataError> {
    let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (col_idx, field) in schema.fields().iter().enumerate() {
        let widened = match field.data_type() {
            DataType::Int64 => vec![DataType::Int64, DataType::Float64],
            DataType::Utf8 => vec![],
            other => vec![other.clone()],
        };

        let typed = widened.into_iter().find_map(|data_type| {
            typed_column(&data_type, column_values(rows, col_idx, nulls)).map(|array| (data_type, array))
        });

        let (data_type, array) = match typed {
            Some(typed) => typed,
            None => {
                if field.data_type() != &DataType::Utf8 {
                    tracing::warn!(
                        "Column '{}' has values beyond the detection sample that are not {:?}; reading it as text",
                        field.name(),
                        field.data_type()
                    );
                }
                let mut builder = StringBuilder::new();
                for value in column_values(rows, col_idx, nulls) {
                    builder.append_option(value);
                }
                (DataType::Utf8, Arc::new(builder.finish()) as ArrayRef)
            }
        };

        if &data_type == field.data_type() {
            fields.push(field.clone());
        } else {
            fields.push(Arc::new(Field::new(field.name(), data_type, true)));
        }
        columns.push(array);
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    Ok(Dataset::new(batch))
}

fn column_values<'a>(
    rows: &'a [Vec<String>],
    col_idx: usize,
    nulls: &'a NullConfig,
) -> impl Iterator<Item = Option<&'a str>> + 'a {
    rows.iter().map(move |row| {
        row.get(col_idx)
            .filter(|value| !nulls.is_null(value))
            .map(|value| value.trim())
    })
}

/// Typed array for `data_type`, or `None` if any present value fails to parse
fn typed_column<'a>(data_type: &DataType, values: impl Iterator<Item = Option<&'a str>>) -> Option<ArrayRef> {
    let array: ArrayRef = match data_type {
        DataType::Int64 => {
            let mut builder = Int64Builder::new();
            for value in values {
                match value {
                    Some(v) => builder.append_value(v.parse::<i64>().ok()?),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::new();
            for value in values {
                match value {
                    Some(v) => builder.append_value(v.parse::<f64>().ok()?),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Boolean => {
            let mut builder = BooleanBuilder::new();
            for value in values {
                match value {
                    Some(v) => builder.append_value(match v.to_lowercase().as_str() {
                        "true" => true,
                        "false" => false,
                        _ => return None,
                    }),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Timestamp(_, _) => {
            let mut builder = TimestampMillisecondBuilder::new();
            for value in values {
                match value {
                    Some(v) => builder.append_value(parse_datetime_millis(v)?),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        _ => return None,
    };
    Some(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tv_core::{Cell, ColumnKind};

    #[test]
    fn test_reads_typed_columns_with_missing() {
        let data = b"region,sales,month\neast,10,2024-01-01\nwest,,2024-02-01\neast,30,N/A\n";
        let ds = CsvSource::comma(SchemaDetector::default()).read(data).unwrap();

        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.kind("region").unwrap(), ColumnKind::Text);
        assert_eq!(ds.kind("sales").unwrap(), ColumnKind::Numeric);
        assert_eq!(ds.kind("month").unwrap(), ColumnKind::Datetime);
        assert_eq!(
            ds.cells("sales").unwrap(),
            vec![Cell::Number(10.0), Cell::Missing, Cell::Number(30.0)]
        );
        assert_eq!(ds.cells("month").unwrap()[2], Cell::Missing);
    }

    #[test]
    fn test_values_after_detection_sample_are_kept() {
        let mut data = String::from("id,code,score\n");
        for i in 0..1000 {
            data.push_str(&format!("{},{},{}\n", i, i, i));
        }
        data.push_str("1000,A17,2.5\n");

        let ds = CsvSource::comma(SchemaDetector::default()).read(data.as_bytes()).unwrap();
        assert_eq!(ds.num_rows(), 1001);
        assert_eq!(ds.kind("id").unwrap(), ColumnKind::Numeric);
        assert_eq!(ds.kind("code").unwrap(), ColumnKind::Text);
        assert_eq!(ds.cells("code").unwrap()[1000], Cell::from("A17"));
        assert_eq!(ds.cells("score").unwrap()[1000], Cell::Number(2.5));
        assert_eq!(crate::clean(&ds).unwrap().num_rows(), 1001);
    }

    #[test]
    fn test_tab_separated() {
        let data = b"a\tb\n1\tx\n2\ty\n";
        let ds = CsvSource::tab(SchemaDetector::default()).read(data).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.kind("a").unwrap(), ColumnKind::Numeric);
    }
}
