//! Post-ingestion cleaning applied by the upload flow

use arrow::array::Array;
use itertools::Itertools;
use tv_core::{Dataset, Result};

/// Normalise a header: lower-case, `_` as word separator, each word
/// capitalised, and pairs of single-letter words joined (`i_d` -> `ID`).
pub fn normalize_column_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('_', " ");
    let words: Vec<String> = lowered.split_whitespace().map(capitalize).collect();

    let mut joined = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        if i + 1 < words.len() && is_single_letter(&words[i]) && is_single_letter(&words[i + 1]) {
            joined.push(format!("{}{}", words[i], words[i + 1]));
            i += 2;
        } else {
            joined.push(words[i].clone());
            i += 1;
        }
    }
    joined.join(" ")
}

/// Rename every column with [`normalize_column_name`]
pub fn normalize_column_names(dataset: &Dataset) -> Result<Dataset> {
    let names = dataset
        .column_names()
        .iter()
        .map(|name| normalize_column_name(name))
        .collect_vec();
    dataset.with_column_names(&names)
}

/// Drop every row that has a missing value in any column
pub fn drop_missing_rows(dataset: &Dataset) -> Result<Dataset> {
    let batch = dataset.batch();
    if batch.columns().iter().all(|c| c.null_count() == 0) {
        return Ok(dataset.clone());
    }

    let mask = (0..dataset.num_rows())
        .map(|row| batch.columns().iter().all(|c| c.is_valid(row)))
        .collect_vec();
    let cleaned = dataset.filter(&mask)?;
    tracing::info!(
        "Dropped {} rows with missing values",
        dataset.num_rows() - cleaned.num_rows()
    );
    Ok(cleaned)
}

/// Cleaning applied to every upload: drop incomplete rows, then normalise headers
pub fn clean(dataset: &Dataset) -> Result<Dataset> {
    normalize_column_names(&drop_missing_rows(dataset)?)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_single_letter(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}
