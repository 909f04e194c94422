//! Small numeric helpers shared by the reshape functions

use indexmap::IndexMap;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use tv_core::Cell;

/// Observed `[min, max]` over the numeric cells, `None` if there are none
pub fn numeric_range(values: &[Cell]) -> Option<[f64; 2]> {
    values
        .iter()
        .filter_map(Cell::as_f64)
        .filter(|v| !v.is_nan())
        .minmax()
        .into_option()
        .map(|(lo, hi)| [lo, hi])
}

/// Distinct labels of the present cells, in sort order
pub fn sorted_labels(values: &[Cell]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.is_missing())
        .sorted_by(|a, b| a.sort_cmp(b))
        .filter_map(Cell::label)
        .dedup()
        .collect()
}

/// `count` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Mean of `z` per distinct (x, y) pair, in order of first appearance.
/// Rows where any of the three is missing or non-numeric are skipped.
pub fn mean_by_pair(x: &[Cell], y: &[Cell], z: &[Cell]) -> Vec<(f64, f64, f64)> {
    let mut groups: IndexMap<(OrderedFloat<f64>, OrderedFloat<f64>), (f64, usize)> = IndexMap::new();
    for ((x, y), z) in x.iter().zip(y).zip(z) {
        let (Some(x), Some(y), Some(z)) = (x.as_f64(), y.as_f64(), z.as_f64()) else {
            continue;
        };
        if x.is_nan() || y.is_nan() || z.is_nan() {
            continue;
        }
        let entry = groups.entry((OrderedFloat(x), OrderedFloat(y))).or_insert((0.0, 0));
        entry.0 += z;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((x, y), (sum, count))| (x.0, y.0, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_hits_both_ends() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_mean_by_pair_collapses_duplicates() {
        let x = vec![Cell::from(1.0), Cell::from(1.0), Cell::from(2.0), Cell::Missing];
        let y = vec![Cell::from(5.0), Cell::from(5.0), Cell::from(5.0), Cell::from(5.0)];
        let z = vec![Cell::from(2.0), Cell::from(4.0), Cell::from(9.0), Cell::from(1.0)];
        assert_eq!(mean_by_pair(&x, &y, &z), vec![(1.0, 5.0, 3.0), (2.0, 5.0, 9.0)]);
    }

    #[test]
    fn test_range_and_labels() {
        let cells = vec![Cell::from("b"), Cell::Missing, Cell::from("a"), Cell::from("b")];
        assert_eq!(sorted_labels(&cells), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(numeric_range(&cells), None);
        assert_eq!(
            numeric_range(&[Cell::from(3.0), Cell::Missing, Cell::from(-1.0)]),
            Some([-1.0, 3.0])
        );
    }
}
