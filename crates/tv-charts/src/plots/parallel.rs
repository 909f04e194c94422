//! Parallel coordinates and parallel categories: one axis per involved column

use itertools::Itertools;
use tv_core::Result;

use super::utils::{numeric_range, sorted_labels};
use super::{Column, PlotInput};
use crate::spec::{ChartData, Dimension};

pub fn dimensions(input: &PlotInput) -> Result<ChartData> {
    let dimensions = std::iter::once(&input.x)
        .chain(&input.ys)
        .chain(input.color.as_ref())
        .unique_by(|column| column.name.clone())
        .map(dimension)
        .collect();

    Ok(ChartData::Dimensions {
        dimensions,
        color: input.color_cells(),
    })
}

fn dimension(column: &Column) -> Dimension {
    let (range, categories) = if column.kind.is_numeric() {
        (numeric_range(&column.cells), None)
    } else {
        (None, Some(sorted_labels(&column.cells)))
    };
    Dimension {
        label: column.name.clone(),
        values: column.cells.clone(),
        range,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ChartType;
    use tv_core::{Cell, ColumnKind};

    #[test]
    fn test_one_dimension_per_column() {
        let input = PlotInput {
            chart: ChartType::ParallelCoordinates,
            x: Column {
                name: "height".into(),
                kind: ColumnKind::Numeric,
                cells: vec![Cell::from(1.5), Cell::from(2.5), Cell::Missing],
            },
            ys: vec![Column {
                name: "weight".into(),
                kind: ColumnKind::Numeric,
                cells: vec![Cell::from(70.0), Cell::from(50.0), Cell::from(60.0)],
            }],
            color: Some(Column {
                name: "species".into(),
                kind: ColumnKind::Text,
                cells: vec![Cell::from("b"), Cell::from("a"), Cell::from("b")],
            }),
        };

        let ChartData::Dimensions { dimensions, color } = dimensions(&input).unwrap() else {
            panic!("expected dimensions");
        };
        let labels: Vec<_> = dimensions.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["height", "weight", "species"]);
        assert_eq!(dimensions[0].range, Some([1.5, 2.5]));
        assert_eq!(dimensions[1].range, Some([50.0, 70.0]));
        assert_eq!(dimensions[2].categories, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(color.map(|c| c.len()), Some(3));
    }
}
