//! Upload, filter and chart flows across the data and chart crates

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use tv_charts::{build, ChartData, ChartRequest, ChartType};
use tv_core::{Cell, CoreError, Dataset, SortOrder};
use tv_data::{apply, DatasetStore, FilterCondition, FilterOperator, FilterSetStore, FilteredViews};

fn sales_by_region() -> Dataset {
    Dataset::from_columns(vec![
        ("region", Arc::new(StringArray::from(vec!["east", "west", "east"])) as ArrayRef),
        ("sales", Arc::new(Int64Array::from(vec![Some(10), None, Some(30)])) as ArrayRef),
    ])
    .unwrap()
}

fn views() -> FilteredViews {
    FilteredViews::new(
        Arc::new(DatasetStore::new(None)),
        Arc::new(FilterSetStore::in_memory()),
        None,
    )
}

#[test]
fn test_filter_then_bar_keeps_rows_unaggregated() {
    let views = views();
    let id = views.ingest(sales_by_region()).unwrap();
    views
        .replace_filters(
            vec![FilterCondition::new("region", FilterOperator::Eq, "east")],
            Some(&id),
        )
        .unwrap();

    let filtered = views.get(&id).unwrap();
    assert_eq!(filtered.num_rows(), 2);
    assert_eq!(filtered.cells("region").unwrap(), vec![Cell::from("east"), Cell::from("east")]);

    let request = ChartRequest::new(ChartType::Bar, "region").y("sales");
    let spec = build(&filtered, &request).unwrap();
    assert_eq!(spec.data.series("sales").unwrap(), &[Cell::from(10i64), Cell::from(30i64)]);
    assert_eq!(spec.title, "Bar Chart for sales by region");
}

#[test]
fn test_bar_fills_zero_where_line_interpolates() {
    let dataset = Dataset::from_columns(vec![
        ("month", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        ("sales", Arc::new(Float64Array::from(vec![Some(10.0), None, Some(30.0)])) as ArrayRef),
    ])
    .unwrap();

    let bar = build(&dataset, &ChartRequest::new(ChartType::Bar, "month").y("sales")).unwrap();
    assert_eq!(bar.data.series("sales").unwrap()[1], Cell::from(0.0));

    let line = build(&dataset, &ChartRequest::new(ChartType::Line, "month").y("sales")).unwrap();
    assert_eq!(line.data.series("sales").unwrap()[1], Cell::from(20.0));
}

#[test]
fn test_surface_needs_two_numeric_y_columns() {
    let grid: Vec<(f64, f64)> = (0..4).flat_map(|i| (0..4).map(move |j| (i as f64, j as f64))).collect();
    let dataset = Dataset::from_columns(vec![
        ("x", Arc::new(Float64Array::from_iter_values(grid.iter().map(|p| p.0))) as ArrayRef),
        ("a", Arc::new(Float64Array::from_iter_values(grid.iter().map(|p| p.1))) as ArrayRef),
        ("b", Arc::new(Float64Array::from_iter_values(grid.iter().map(|p| p.0 * p.1))) as ArrayRef),
    ])
    .unwrap();

    let one = ChartRequest::new(ChartType::Surface3d, "x").y("a");
    assert!(matches!(build(&dataset, &one), Err(CoreError::ChartArity { .. })));

    let two = ChartRequest::new(ChartType::Surface3d, "x").y("a").y("b");
    let spec = build(&dataset, &two).unwrap();
    let ChartData::Surface { x, y, z } = spec.data else {
        panic!("expected a surface");
    };
    assert_eq!((x.len(), y.len()), (100, 100));
    assert_eq!(z.len(), 100);
    assert!(z.iter().flatten().all(|v| v.is_finite()));
    assert_eq!(spec.layout.z_title.as_deref(), Some("b"));
}

#[test]
fn test_custom_order_beats_sort_order() {
    for sort in [SortOrder::Asc, SortOrder::Desc] {
        let request = ChartRequest::new(ChartType::Bar, "region")
            .y("sales")
            .sort(sort)
            .custom_order(["west", "east"]);
        let spec = build(&sales_by_region(), &request).unwrap();
        assert_eq!(spec.data.x().unwrap()[0], Cell::from("west"));
        assert_eq!(
            spec.layout.category_order,
            Some(vec!["west".to_string(), "east".to_string()])
        );
    }
}

#[test]
fn test_filters_are_idempotent_and_commutative() {
    let dataset = Dataset::from_columns(vec![
        ("region", Arc::new(StringArray::from(vec!["east", "west", "east", "north"])) as ArrayRef),
        ("sales", Arc::new(Int64Array::from(vec![10, 20, 30, 40])) as ArrayRef),
    ])
    .unwrap();
    let filters = vec![
        FilterCondition::new("sales", FilterOperator::GtEq, 20i64),
        FilterCondition::new("region", FilterOperator::NotEq, "north"),
    ];

    let once = apply(&dataset, &filters).unwrap();
    assert_eq!(once.num_rows(), 2);
    assert_eq!(apply(&once, &filters).unwrap(), once);

    let reversed: Vec<_> = filters.iter().rev().cloned().collect();
    assert_eq!(apply(&dataset, &reversed).unwrap(), once);
    assert_eq!(apply(&dataset, &[]).unwrap(), dataset);
}

#[test]
fn test_membership_round_trip() {
    let dataset = Dataset::from_columns(vec![(
        "tag",
        Arc::new(StringArray::from(vec!["a", "b", "c", "d", "b"])) as ArrayRef,
    )])
    .unwrap();

    let kept = apply(&dataset, &[FilterCondition::new("tag", FilterOperator::In, "a, b ,c")]).unwrap();
    let dropped = apply(&dataset, &[FilterCondition::new("tag", FilterOperator::NotIn, "a, b ,c")]).unwrap();

    assert_eq!(kept.num_rows(), 4);
    assert_eq!(dropped.cells("tag").unwrap(), vec![Cell::from("d")]);
    assert_eq!(kept.num_rows() + dropped.num_rows(), dataset.num_rows());
}

#[test]
fn test_unknown_filter_column_mutates_nothing() {
    let views = views();
    let id = views.ingest(sales_by_region()).unwrap();
    let err = views
        .replace_filters(vec![FilterCondition::new("zzz", FilterOperator::Eq, 1i64)], Some(&id));
    assert!(matches!(err, Err(CoreError::UnknownColumn { .. })));
    assert_eq!(views.get(&id).unwrap().num_rows(), 3);
}
