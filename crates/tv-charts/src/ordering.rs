//! Row ordering applied before reshaping

use indexmap::IndexSet;
use tv_core::{Cell, Dataset, Result};

use crate::request::ChartRequest;

/// Reorder rows so categorical axes and grouped series render predictably.
///
/// A custom category order ranks rows by the position of their x label in
/// that list (unlisted and missing values last) and takes precedence over
/// `sort_order`. Otherwise rows are sorted by x, then by colour.
pub fn order_rows(dataset: &Dataset, request: &ChartRequest) -> Result<Dataset> {
    let x = dataset.cells(&request.x_column)?;
    let mut rows: Vec<usize> = (0..dataset.num_rows()).collect();

    match request.category_order() {
        Some(order) => {
            let ranks: IndexSet<&str> = order.iter().map(String::as_str).collect();
            let rank = |cell: &Cell| {
                cell.label()
                    .and_then(|label| ranks.get_index_of(label.as_str()))
                    .unwrap_or(usize::MAX)
            };
            let keys: Vec<usize> = x.iter().map(rank).collect();
            rows.sort_by_key(|&row| keys[row]);
        }
        None => {
            let color = request
                .color_column()
                .map(|column| dataset.cells(column))
                .transpose()?;
            let order = request.sort_order;
            rows.sort_by(|&a, &b| {
                order.compare(&x[a], &x[b]).then_with(|| match &color {
                    Some(color) => order.compare(&color[a], &color[b]),
                    None => std::cmp::Ordering::Equal,
                })
            });
        }
    }

    if rows.iter().enumerate().all(|(position, &row)| position == row) {
        return Ok(dataset.clone());
    }
    dataset.take(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ChartType;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;
    use tv_core::SortOrder;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("region", Arc::new(StringArray::from(vec!["east", "west", "east", "north"])) as ArrayRef),
            ("team", Arc::new(StringArray::from(vec!["b", "a", "a", "c"])) as ArrayRef),
            ("sales", Arc::new(Int64Array::from(vec![1, 2, 3, 4])) as ArrayRef),
        ])
        .unwrap()
    }

    fn sales(ds: &Dataset) -> Vec<Cell> {
        ds.cells("sales").unwrap()
    }

    #[test]
    fn test_sorts_by_x_then_color() {
        let request = ChartRequest::new(ChartType::Bar, "region").y("sales").color("team");
        let ordered = order_rows(&dataset(), &request).unwrap();
        assert_eq!(
            sales(&ordered),
            vec![Cell::from(3i64), Cell::from(1i64), Cell::from(4i64), Cell::from(2i64)]
        );

        let request = request.sort(SortOrder::Desc);
        let ordered = order_rows(&dataset(), &request).unwrap();
        assert_eq!(
            sales(&ordered),
            vec![Cell::from(2i64), Cell::from(4i64), Cell::from(1i64), Cell::from(3i64)]
        );
    }

    #[test]
    fn test_custom_order_wins_over_sort_order() {
        let request = ChartRequest::new(ChartType::Bar, "region")
            .y("sales")
            .sort(SortOrder::Desc)
            .custom_order(["west", "east"]);
        let ordered = order_rows(&dataset(), &request).unwrap();
        let regions = ordered.cells("region").unwrap();
        assert_eq!(
            regions,
            vec![
                Cell::from("west"),
                Cell::from("east"),
                Cell::from("east"),
                Cell::from("north")
            ]
        );
    }
}
