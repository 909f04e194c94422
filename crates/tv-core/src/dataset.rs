//! In-memory columnar dataset backed by an arrow `RecordBatch`

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray, UInt32Array,
};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::cell::Cell;
use crate::error::{CoreError, Result};

/// Runtime kind of a column, derived from its arrow data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Datetime,
    Boolean,
    Categorical,
}

impl ColumnKind {
    pub fn from_data_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => ColumnKind::Numeric,
            DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => ColumnKind::Datetime,
            DataType::Dictionary(_, _) => ColumnKind::Categorical,
            _ => ColumnKind::Text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

/// A table with a fixed schema and an ordered sequence of rows.
///
/// Datasets are immutable: filtering, reordering and renaming produce new
/// datasets sharing the underlying buffers where possible.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Dataset with no columns and no rows
    pub fn empty() -> Self {
        Self::new(RecordBatch::new_empty(Arc::new(Schema::empty())))
    }

    /// Build a dataset from named arrays. Every column is nullable.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, ArrayRef)>) -> Result<Self> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, array) in columns {
            fields.push(Field::new(name.into(), array.data_type().clone(), true));
            arrays.push(array);
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self::new(batch))
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// Index of a column, failing with `UnknownColumn` if absent
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .index_of(name)
            .map_err(|_| CoreError::unknown_column(name, self.column_names()))
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        let idx = self.require_column(name)?;
        Ok(self.batch.column(idx))
    }

    pub fn kind(&self, name: &str) -> Result<ColumnKind> {
        Ok(ColumnKind::from_data_type(self.column(name)?.data_type()))
    }

    /// Schema as (name, kind) pairs in column order
    pub fn kinds(&self) -> Vec<(String, ColumnKind)> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| (f.name().clone(), ColumnKind::from_data_type(f.data_type())))
            .collect()
    }

    /// Materialise a column as cells, one per row
    pub fn cells(&self, name: &str) -> Result<Vec<Cell>> {
        let column = self.column(name)?;
        column_cells(column)
    }

    /// Keep the rows whose mask entry is true, preserving order
    pub fn filter(&self, mask: &[bool]) -> Result<Dataset> {
        let mask = BooleanArray::from(mask.to_vec());
        let batch = compute::filter_record_batch(&self.batch, &mask)?;
        Ok(Self::new(batch))
    }

    /// Reorder or subset rows by index
    pub fn take(&self, indices: &[usize]) -> Result<Dataset> {
        let indices = UInt32Array::from_iter_values(indices.iter().map(|&i| i as u32));
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|c| compute::take(c.as_ref(), &indices, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = RecordBatch::try_new(self.batch.schema(), columns)?;
        Ok(Self::new(batch))
    }

    /// Replace the column names, keeping data and types
    pub fn with_column_names(&self, names: &[String]) -> Result<Dataset> {
        let schema = self.batch.schema();
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .zip(names)
            .map(|(f, name)| Field::new(name.clone(), f.data_type().clone(), f.is_nullable()))
            .collect();
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), self.batch.columns().to_vec())?;
        Ok(Self::new(batch))
    }
}

/// Convert an arrow array into cells according to its column kind
fn column_cells(column: &ArrayRef) -> Result<Vec<Cell>> {
    let cells = match ColumnKind::from_data_type(column.data_type()) {
        ColumnKind::Numeric => {
            let cast = compute::cast(column.as_ref(), &DataType::Float64)?;
            downcast::<Float64Array>(&cast)?
                .iter()
                .map(|v| v.map(Cell::Number).unwrap_or(Cell::Missing))
                .collect()
        }
        ColumnKind::Boolean => downcast::<BooleanArray>(column)?
            .iter()
            .map(|v| v.map(Cell::Bool).unwrap_or(Cell::Missing))
            .collect(),
        ColumnKind::Datetime => {
            let cast = compute::cast(
                column.as_ref(),
                &DataType::Timestamp(TimeUnit::Millisecond, None),
            )?;
            downcast::<TimestampMillisecondArray>(&cast)?
                .iter()
                .map(|v| v.map(Cell::DateTime).unwrap_or(Cell::Missing))
                .collect()
        }
        ColumnKind::Text | ColumnKind::Categorical => match compute::cast(column.as_ref(), &DataType::Utf8) {
            Ok(cast) => downcast::<StringArray>(&cast)?
                .iter()
                .map(|v| v.map(|s| Cell::Text(s.to_string())).unwrap_or(Cell::Missing))
                .collect(),
            Err(_) => (0..column.len())
                .map(|i| {
                    if column.is_null(i) {
                        Ok(Cell::Missing)
                    } else {
                        arrow::util::display::array_value_to_string(column, i).map(Cell::Text)
                    }
                })
                .collect::<std::result::Result<Vec<_>, _>>()?,
        },
    };
    Ok(cells)
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        CoreError::Arrow(arrow::error::ArrowError::CastError(format!(
            "unexpected array type {}",
            array.data_type()
        )))
    })
}
