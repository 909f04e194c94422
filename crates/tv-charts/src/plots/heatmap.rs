//! Heatmap: row counts per (x, y) pair

use ahash::AHashMap;
use tv_core::{Cell, Result};

use super::utils::sorted_labels;
use super::PlotInput;
use crate::spec::ChartData;

/// Pivot rows into a zero-filled count matrix indexed by x (rows) and the
/// first y column (columns). Rows missing either value are not counted.
pub fn counts(input: &PlotInput) -> Result<ChartData> {
    let y = input.require_y()?;

    let (xs, ys): (Vec<Cell>, Vec<Cell>) = input
        .x
        .cells
        .iter()
        .zip(&y.cells)
        .filter(|(x, y)| !x.is_missing() && !y.is_missing())
        .map(|(x, y)| (x.clone(), y.clone()))
        .unzip();

    let x_labels = sorted_labels(&xs);
    let y_labels = sorted_labels(&ys);
    let x_index: AHashMap<&str, usize> = x_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let y_index: AHashMap<&str, usize> = y_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

    let mut counts = vec![vec![0u64; y_labels.len()]; x_labels.len()];
    for (x, y) in xs.iter().zip(&ys) {
        let (Some(x), Some(y)) = (x.label(), y.label()) else {
            continue;
        };
        if let (Some(&i), Some(&j)) = (x_index.get(x.as_str()), y_index.get(y.as_str())) {
            counts[i][j] += 1;
        }
    }

    Ok(ChartData::Matrix {
        x_labels,
        y_labels,
        counts,
    })
}
