//! Paged, searchable, sortable access to a filtered view

use serde::{Deserialize, Serialize};
use tv_core::{Cell, Dataset, Result, SortOrder};

use crate::store::DatasetId;
use crate::view::FilteredViews;

/// One page request from a data-grid client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridQuery {
    pub start: usize,
    pub length: usize,
    /// Case-insensitive substring matched against every cell
    pub search: Option<String>,
    /// Column index and direction
    pub order: Option<(usize, SortOrder)>,
}

impl Default for GridQuery {
    fn default() -> Self {
        Self {
            start: 0,
            length: 10,
            search: None,
            order: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GridPage {
    pub records_total: usize,
    pub records_filtered: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GridQuery {
    /// Search, sort and page `dataset`
    pub fn run(&self, dataset: &Dataset) -> Result<GridPage> {
        let columns = dataset.column_names();
        let cells = columns
            .iter()
            .map(|name| dataset.cells(name))
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<usize> = (0..dataset.num_rows()).collect();

        if let Some(needle) = self.search.as_deref().map(str::to_lowercase).filter(|s| !s.is_empty()) {
            rows.retain(|&row| {
                cells.iter().any(|column| {
                    column[row]
                        .label()
                        .is_some_and(|label| label.to_lowercase().contains(&needle))
                })
            });
        }

        // Out-of-range column indices leave the order untouched
        if let Some((column, order)) = self.order {
            if let Some(values) = cells.get(column) {
                rows.sort_by(|&a, &b| order.compare(&values[a], &values[b]));
            }
        }

        let page = rows
            .iter()
            .skip(self.start)
            .take(self.length)
            .map(|&row| cells.iter().map(|column| column[row].clone()).collect())
            .collect();

        Ok(GridPage {
            records_total: dataset.num_rows(),
            records_filtered: rows.len(),
            columns,
            rows: page,
            error: None,
        })
    }

    /// Page over the filtered view for `id`. Never fails: an unknown id
    /// yields an empty page and other failures are reported in `error`.
    pub fn run_on(&self, views: &FilteredViews, id: &DatasetId) -> GridPage {
        let outcome = views.get(id).and_then(|view| self.run(&view));
        match outcome {
            Ok(page) => page,
            Err(tv_core::CoreError::DatasetNotFound(_)) => GridPage::default(),
            Err(e) => {
                tracing::warn!("Grid query on dataset {} failed: {}", id, e);
                GridPage {
                    error: Some(e.to_string()),
                    ..GridPage::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DatasetStore, FilterSetStore};
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;

    fn people() -> Dataset {
        Dataset::from_columns(vec![
            (
                "name",
                Arc::new(StringArray::from(vec![Some("Alice"), Some("bob"), Some("Carol"), None])) as ArrayRef,
            ),
            (
                "age",
                Arc::new(Int64Array::from(vec![Some(30), None, Some(25), Some(41)])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = GridQuery {
            search: Some("B".into()),
            ..GridQuery::default()
        };
        let page = query.run(&people()).unwrap();
        assert_eq!(page.records_total, 4);
        assert_eq!(page.records_filtered, 1);
        assert_eq!(page.rows, vec![vec![Cell::from("bob"), Cell::Missing]]);
    }

    #[test]
    fn test_sort_descending_keeps_missing_last() {
        let query = GridQuery {
            order: Some((1, SortOrder::Desc)),
            ..GridQuery::default()
        };
        let page = query.run(&people()).unwrap();
        let ages: Vec<Cell> = page.rows.iter().map(|r| r[1].clone()).collect();
        assert_eq!(
            ages,
            vec![Cell::from(41i64), Cell::from(30i64), Cell::from(25i64), Cell::Missing]
        );
    }

    #[test]
    fn test_paging() {
        let query = GridQuery {
            start: 2,
            length: 5,
            ..GridQuery::default()
        };
        let page = query.run(&people()).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.records_filtered, 4);
        assert_eq!(page.rows[0][0], Cell::from("Carol"));
    }

    #[test]
    fn test_out_of_range_order_column_is_ignored() {
        let query = GridQuery {
            order: Some((9, SortOrder::Asc)),
            ..GridQuery::default()
        };
        let page = query.run(&people()).unwrap();
        assert_eq!(page.rows[0][0], Cell::from("Alice"));
    }

    #[test]
    fn test_unknown_dataset_gives_empty_page() {
        let views = FilteredViews::new(
            Arc::new(DatasetStore::default()),
            Arc::new(FilterSetStore::in_memory()),
            None,
        );
        let page = GridQuery::default().run_on(&views, &DatasetId::from("7"));
        assert_eq!(page, GridPage::default());
    }
}
