//! Missing-value policies applied per chart family

use tv_core::Cell;

/// Label used where a missing value has to be shown as a category
pub const MISSING_LABEL: &str = "Missing";

pub fn fill_zero(values: &[Cell]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| if v.is_missing() { Cell::Number(0.0) } else { v.clone() })
        .collect()
}

pub fn label_missing(values: &[Cell]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| {
            if v.is_missing() {
                Cell::from(MISSING_LABEL)
            } else {
                v.clone()
            }
        })
        .collect()
}

pub fn missing_indicator(values: &[Cell]) -> Vec<bool> {
    values.iter().map(Cell::is_missing).collect()
}

/// Linear interpolation over row positions.
///
/// Gaps between two known values are filled on the straight line between
/// them, values after the last known one repeat it, and leading gaps stay
/// missing. Returns `None` if any present value is not numeric.
pub fn interpolate_linear(values: &[Cell]) -> Option<Vec<Cell>> {
    let numbers = values
        .iter()
        .map(|v| match v {
            Cell::Missing => Some(None),
            other => other.as_f64().map(Some),
        })
        .collect::<Option<Vec<Option<f64>>>>()?;

    let mut out = Vec::with_capacity(numbers.len());
    let mut previous: Option<(usize, f64)> = None;
    // Next known value after the current gap, looked up once per gap
    let mut next: Option<Option<(usize, f64)>> = None;

    for (i, value) in numbers.iter().enumerate() {
        match value {
            Some(v) => {
                out.push(Cell::Number(*v));
                previous = Some((i, *v));
                next = None;
            }
            None => {
                let upcoming = *next.get_or_insert_with(|| {
                    numbers[i + 1..]
                        .iter()
                        .enumerate()
                        .find_map(|(offset, v)| v.map(|v| (i + 1 + offset, v)))
                });
                let filled = match (previous, upcoming) {
                    (Some((i0, v0)), Some((i1, v1))) => {
                        let t = (i - i0) as f64 / (i1 - i0) as f64;
                        Cell::Number(v0 + t * (v1 - v0))
                    }
                    (Some((_, v0)), None) => Cell::Number(v0),
                    (None, _) => Cell::Missing,
                };
                out.push(filled);
            }
        }
    }
    Some(out)
}
