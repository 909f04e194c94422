//! Parsing uploaded files into datasets

pub mod csv_source;
pub mod json_source;

pub use csv_source::CsvSource;
pub use json_source::JsonSource;

use tv_core::Dataset;

use crate::config::NullConfig;
use crate::schema::SchemaDetector;
use crate::DataError;

/// Parse file bytes into a dataset using the default missing-value markers.
/// `extension` is matched case-insensitively, with or without a leading dot.
pub fn read_dataset(bytes: &[u8], extension: &str) -> Result<Dataset, DataError> {
    read_dataset_with(bytes, extension, &NullConfig::default())
}

pub fn read_dataset_with(bytes: &[u8], extension: &str, nulls: &NullConfig) -> Result<Dataset, DataError> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    let detector = SchemaDetector::new(nulls.clone());
    match extension.as_str() {
        "csv" => CsvSource::comma(detector).read(bytes),
        "tsv" => CsvSource::tab(detector).read(bytes),
        "json" => JsonSource::new(detector).read(bytes),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}
