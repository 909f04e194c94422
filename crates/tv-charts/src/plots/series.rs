//! Row-wise families: no grid reshaping, only the family's missing-value policy

use tv_core::Result;

use super::{reshape_error, PlotInput};
use crate::missing::{fill_zero, interpolate_linear, label_missing, missing_indicator};
use crate::request::MissingPolicy;
use crate::spec::{ChartData, Series};

pub fn rows(input: &PlotInput) -> Result<ChartData> {
    let mut x = input.x.cells.clone();
    let mut is_missing = None;

    let series = match input.chart.missing_policy() {
        MissingPolicy::FillZero => input
            .ys
            .iter()
            .map(|y| Series {
                name: y.name.clone(),
                values: fill_zero(&y.cells),
            })
            .collect(),
        MissingPolicy::Interpolate => input
            .ys
            .iter()
            .map(|y| {
                let values = interpolate_linear(&y.cells).ok_or_else(|| {
                    reshape_error(
                        input.chart,
                        format!("cannot interpolate non-numeric column '{}'", y.name),
                    )
                })?;
                Ok(Series {
                    name: y.name.clone(),
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        MissingPolicy::Indicate => {
            is_missing = input.first_y().map(|y| missing_indicator(&y.cells));
            passthrough(input)
        }
        MissingPolicy::LabelMissing => {
            // Pie-like families draw a single slice value per row
            x = label_missing(&x);
            input
                .first_y()
                .map(|y| Series {
                    name: y.name.clone(),
                    values: label_missing(&y.cells),
                })
                .into_iter()
                .collect()
        }
        MissingPolicy::LabelMissingX => {
            x = label_missing(&x);
            passthrough(input)
        }
        MissingPolicy::Keep => passthrough(input),
    };

    Ok(ChartData::Rows {
        x,
        series,
        color: input.color_cells(),
        is_missing,
    })
}

fn passthrough(input: &PlotInput) -> Vec<Series> {
    input
        .ys
        .iter()
        .map(|y| Series {
            name: y.name.clone(),
            values: y.cells.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::Column;
    use crate::request::ChartType;
    use tv_core::{Cell, ColumnKind, CoreError};

    fn input(chart: ChartType, y: Vec<Cell>) -> PlotInput {
        PlotInput {
            chart,
            x: Column {
                name: "month".into(),
                kind: ColumnKind::Text,
                cells: vec![Cell::from("jan"), Cell::Missing, Cell::from("mar")],
            },
            ys: vec![Column {
                name: "sales".into(),
                kind: ColumnKind::Numeric,
                cells: y,
            }],
            color: None,
        }
    }

    fn sales() -> Vec<Cell> {
        vec![Cell::from(1.0), Cell::Missing, Cell::from(5.0)]
    }

    #[test]
    fn test_bar_fills_zero_and_line_interpolates() {
        let bar = rows(&input(ChartType::Bar, sales())).unwrap();
        assert_eq!(bar.series("sales").unwrap()[1], Cell::from(0.0));

        let line = rows(&input(ChartType::Line, sales())).unwrap();
        assert_eq!(line.series("sales").unwrap()[1], Cell::from(3.0));
    }

    #[test]
    fn test_line_rejects_text() {
        let err = rows(&input(ChartType::Line, vec![Cell::from("a"), Cell::Missing, Cell::from("b")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Reshape { chart, .. } if chart == "line"));
    }

    #[test]
    fn test_scatter_marks_missing_rows() {
        let data = rows(&input(ChartType::Scatter, sales())).unwrap();
        match data {
            ChartData::Rows { is_missing, series, .. } => {
                assert_eq!(is_missing, Some(vec![false, true, false]));
                assert_eq!(series[0].values[1], Cell::Missing);
            }
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn test_pie_and_histogram_label_missing() {
        let pie = rows(&input(ChartType::Pie, sales())).unwrap();
        assert_eq!(pie.x().unwrap()[1], Cell::from("Missing"));
        assert_eq!(pie.series("sales").unwrap()[1], Cell::from("Missing"));

        let histogram = rows(&input(ChartType::Histogram, sales())).unwrap();
        assert_eq!(histogram.x().unwrap()[1], Cell::from("Missing"));
        assert_eq!(histogram.series("sales").unwrap()[1], Cell::Missing);
    }

    #[test]
    fn test_other_families_pass_through() {
        let violin = rows(&input(ChartType::Violin, sales())).unwrap();
        assert_eq!(violin.series("sales").unwrap(), sales().as_slice());
        assert_eq!(violin.x().unwrap()[1], Cell::Missing);
    }
}
