//! Funnel and waterfall: the first y column summed per x category

use indexmap::IndexMap;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use tv_core::Result;

use super::PlotInput;
use crate::spec::{ChartData, StepMeasure};

/// Sum of the first y per x label, in order of first appearance.
/// Rows with a missing x are dropped; missing y values add nothing.
fn sum_by_x(input: &PlotInput) -> Result<IndexMap<String, f64>> {
    let y = input.require_y()?;
    let values = y.numbers(input.chart)?;

    let mut sums: IndexMap<String, f64> = IndexMap::new();
    for (x, value) in input.x.cells.iter().zip(values) {
        let Some(label) = x.label() else {
            continue;
        };
        *sums.entry(label).or_insert(0.0) += value.unwrap_or(0.0);
    }
    Ok(sums)
}

/// Steps sorted ascending by their summed value
pub fn funnel(input: &PlotInput) -> Result<ChartData> {
    let (labels, values): (Vec<String>, Vec<f64>) = sum_by_x(input)?
        .into_iter()
        .sorted_by_key(|(_, sum)| OrderedFloat(*sum))
        .unzip();
    Ok(ChartData::Steps {
        labels,
        values,
        measures: None,
    })
}

/// Every step is a relative delta except the last, which is the total
pub fn waterfall(input: &PlotInput) -> Result<ChartData> {
    let (labels, values): (Vec<String>, Vec<f64>) = sum_by_x(input)?.into_iter().unzip();
    let measures = (0..labels.len())
        .map(|i| {
            if i + 1 == labels.len() {
                StepMeasure::Total
            } else {
                StepMeasure::Relative
            }
        })
        .collect();
    Ok(ChartData::Steps {
        labels,
        values,
        measures: Some(measures),
    })
}
