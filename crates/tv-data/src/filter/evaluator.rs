use std::cmp::Ordering;
use std::sync::Arc;

use tv_core::events::events::CoercionFallback;
use tv_core::{parse_datetime_millis, Cell, ColumnKind, Dataset, EventBus, Result};

use super::{FilterCondition, FilterOperator, FilterValue};

/// Evaluate conditions against a dataset without executing any
/// user-supplied text. Conditions are AND-combined.
pub fn apply(dataset: &Dataset, filters: &[FilterCondition]) -> Result<Dataset> {
    FilterEvaluator::new().apply(dataset, filters)
}

/// Applies filter sets to datasets, optionally reporting coercion
/// fallbacks on an event bus
#[derive(Default, Clone)]
pub struct FilterEvaluator {
    events: Option<Arc<EventBus>>,
}

/// Right-hand side after normalisation
enum Operand {
    Scalar(Cell),
    /// A list supplied to a scalar operator never compares equal or ordered
    Unmatchable,
    Set(Vec<Cell>),
}

/// A validated condition ready to be tested against cells
struct Predicate<'a> {
    column: &'a str,
    operator: FilterOperator,
    operand: Operand,
}

impl Predicate<'_> {
    fn matches(&self, cell: &Cell) -> bool {
        match (&self.operand, self.operator) {
            (Operand::Set(set), FilterOperator::In) => set.iter().any(|v| cell.loose_eq(v)),
            (Operand::Set(set), FilterOperator::NotIn) => !set.iter().any(|v| cell.loose_eq(v)),
            (Operand::Set(_), _) => false,
            (Operand::Unmatchable, op) => op == FilterOperator::NotEq,
            (Operand::Scalar(value), op) => {
                let ordering = cell.loose_cmp(value);
                match op {
                    FilterOperator::Eq => ordering == Some(Ordering::Equal),
                    FilterOperator::NotEq => ordering != Some(Ordering::Equal),
                    FilterOperator::Gt => ordering == Some(Ordering::Greater),
                    FilterOperator::Lt => ordering == Some(Ordering::Less),
                    FilterOperator::GtEq => {
                        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                    }
                    FilterOperator::LtEq => {
                        matches!(ordering, Some(Ordering::Less | Ordering::Equal))
                    }
                    FilterOperator::In | FilterOperator::NotIn => false,
                }
            }
        }
    }
}

impl FilterEvaluator {
    pub fn new() -> Self {
        Self { events: None }
    }

    pub fn with_events(events: Arc<EventBus>) -> Self {
        Self { events: Some(events) }
    }

    /// Return the rows of `dataset` satisfying every condition, in their
    /// original order. All conditions are validated before any row is tested,
    /// so an invalid set never produces a partial result.
    pub fn apply(&self, dataset: &Dataset, filters: &[FilterCondition]) -> Result<Dataset> {
        if filters.is_empty() {
            return Ok(dataset.clone());
        }
        let mask = self.mask(dataset, filters)?;
        let filtered = dataset.filter(&mask)?;
        tracing::debug!(
            "Filtered {} rows to {} with {} conditions",
            dataset.num_rows(),
            filtered.num_rows(),
            filters.len()
        );
        Ok(filtered)
    }

    /// Validate columns and operators without evaluating any row
    pub fn check(&self, dataset: &Dataset, filters: &[FilterCondition]) -> Result<()> {
        for condition in filters {
            dataset.require_column(&condition.column)?;
            condition.operator()?;
        }
        Ok(())
    }

    /// Row mask for the conjunction of `filters`
    pub fn mask(&self, dataset: &Dataset, filters: &[FilterCondition]) -> Result<Vec<bool>> {
        let predicates = filters
            .iter()
            .map(|condition| self.compile(dataset, condition))
            .collect::<Result<Vec<_>>>()?;

        let mut mask = vec![true; dataset.num_rows()];
        for predicate in &predicates {
            let cells = dataset.cells(predicate.column)?;
            for (keep, cell) in mask.iter_mut().zip(&cells) {
                *keep = *keep && predicate.matches(cell);
            }
        }
        Ok(mask)
    }

    fn compile<'a>(&self, dataset: &Dataset, condition: &'a FilterCondition) -> Result<Predicate<'a>> {
        dataset.require_column(&condition.column)?;
        let operator = condition.operator()?;
        let kind = dataset.kind(&condition.column)?;

        let operand = if operator.is_membership() {
            Operand::Set(condition.value.to_list())
        } else {
            match &condition.value {
                FilterValue::List(_) => {
                    tracing::warn!(
                        "List value supplied to '{}' on column '{}'; no row compares against a list",
                        operator,
                        condition.column
                    );
                    Operand::Unmatchable
                }
                FilterValue::Scalar(value) => Operand::Scalar(self.coerce(condition, operator, value, kind)),
            }
        };

        Ok(Predicate {
            column: &condition.column,
            operator,
            operand,
        })
    }

    /// Coerce a scalar to the column's kind, keeping it as supplied (and
    /// reporting the fallback) when that is not possible
    fn coerce(&self, condition: &FilterCondition, operator: FilterOperator, value: &Cell, kind: ColumnKind) -> Cell {
        let coerced = match (kind, value) {
            (_, Cell::Missing) => return Cell::Missing,
            (ColumnKind::Numeric | ColumnKind::Boolean, Cell::Number(_) | Cell::Bool(_)) => {
                return value.clone()
            }
            (ColumnKind::Numeric | ColumnKind::Boolean, Cell::Text(text)) => {
                text.trim().parse::<f64>().ok().map(Cell::Number)
            }
            (ColumnKind::Datetime, Cell::DateTime(_)) => return value.clone(),
            (ColumnKind::Datetime, Cell::Text(text)) => parse_datetime_millis(text).map(Cell::DateTime),
            (ColumnKind::Numeric | ColumnKind::Boolean | ColumnKind::Datetime, _) => None,
            (ColumnKind::Text | ColumnKind::Categorical, _) => return value.clone(),
        };

        coerced.unwrap_or_else(|| {
            tracing::warn!(
                "Could not coerce {} to {} for column '{}'; comparing as supplied",
                value,
                kind,
                condition.column
            );
            if let Some(events) = &self.events {
                events.publish(CoercionFallback {
                    column: condition.column.clone(),
                    operator: operator.to_string(),
                    value: value.clone(),
                    target_kind: kind,
                });
            }
            value.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
    use parking_lot::Mutex;
    use tv_core::CoreError;

    fn sales() -> Dataset {
        Dataset::from_columns(vec![
            (
                "region",
                Arc::new(StringArray::from(vec![Some("east"), Some("west"), Some("east"), None])) as ArrayRef,
            ),
            (
                "sales",
                Arc::new(Int64Array::from(vec![Some(10), Some(20), Some(30), None])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    fn cond(column: &str, op: FilterOperator, value: impl Into<FilterValue>) -> FilterCondition {
        FilterCondition::new(column, op, value)
    }

    #[test]
    fn test_empty_set_is_identity() {
        let ds = sales();
        assert_eq!(apply(&ds, &[]).unwrap(), ds);
    }

    #[test]
    fn test_equality_on_text() {
        let out = apply(&sales(), &[cond("region", FilterOperator::Eq, "east")]).unwrap();
        assert_eq!(out.cells("sales").unwrap(), vec![Cell::from(10i64), Cell::from(30i64)]);
    }

    #[test]
    fn test_text_value_is_coerced_for_numeric_column() {
        let out = apply(&sales(), &[cond("sales", FilterOperator::Gt, "15")]).unwrap();
        assert_eq!(out.cells("sales").unwrap(), vec![Cell::from(20i64), Cell::from(30i64)]);
    }

    #[test]
    fn test_not_equal_keeps_missing() {
        let out = apply(&sales(), &[cond("region", FilterOperator::NotEq, "east")]).unwrap();
        assert_eq!(out.cells("region").unwrap(), vec![Cell::from("west"), Cell::Missing]);
    }

    #[test]
    fn test_membership_with_comma_string() {
        let out = apply(&sales(), &[cond("region", FilterOperator::In, "east, north")]).unwrap();
        assert_eq!(out.num_rows(), 2);

        let out = apply(&sales(), &[cond("region", FilterOperator::NotIn, "east,north")]).unwrap();
        assert_eq!(out.cells("region").unwrap(), vec![Cell::from("west"), Cell::Missing]);
    }

    #[test]
    fn test_in_and_not_in_partition_rows() {
        let ds = sales();
        let set = FilterValue::List(vec![Cell::from(10i64), Cell::from(30i64)]);
        let kept = apply(&ds, &[cond("sales", FilterOperator::In, set.clone())]).unwrap();
        let rest = apply(&ds, &[cond("sales", FilterOperator::NotIn, set)]).unwrap();
        assert_eq!(kept.num_rows() + rest.num_rows(), ds.num_rows());
    }

    #[test]
    fn test_conditions_are_and_combined() {
        let filters = vec![
            cond("region", FilterOperator::Eq, "east"),
            cond("sales", FilterOperator::GtEq, 30i64),
        ];
        let out = apply(&sales(), &filters).unwrap();
        assert_eq!(out.cells("sales").unwrap(), vec![Cell::from(30i64)]);
    }

    #[test]
    fn test_unknown_column_rejected_before_evaluation() {
        let filters = vec![
            cond("region", FilterOperator::Eq, "east"),
            cond("profit", FilterOperator::Gt, 1i64),
        ];
        let err = apply(&sales(), &filters).unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn { ref column, .. } if column == "profit"));
    }

    #[test]
    fn test_operator_outside_whitelist() {
        let condition = FilterCondition {
            column: "sales".into(),
            operator: "__import__".into(),
            value: FilterValue::from(1i64),
        };
        let err = apply(&sales(), &[condition.clone()]).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedOperator(op) if op == "__import__"));

        let evaluator = FilterEvaluator::new();
        assert!(evaluator.check(&sales(), &[condition]).is_err());
        assert!(evaluator.check(&sales(), &[cond("sales", FilterOperator::Lt, "x")]).is_ok());
    }

    #[test]
    fn test_failed_coercion_reports_and_compares_raw() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe_fn::<CoercionFallback, _>(move |e| sink.lock().push((e.column.clone(), e.target_kind)));

        let evaluator = FilterEvaluator::with_events(bus);
        let out = evaluator
            .apply(&sales(), &[cond("sales", FilterOperator::Eq, "lots")])
            .unwrap();
        assert_eq!(out.num_rows(), 0);
        assert_eq!(*seen.lock(), vec![("sales".to_string(), ColumnKind::Numeric)]);

        // Ordering against an incomparable raw value selects nothing
        let out = evaluator
            .apply(&sales(), &[cond("sales", FilterOperator::Lt, "lots")])
            .unwrap();
        assert_eq!(out.num_rows(), 0);
    }

    #[test]
    fn test_datetime_comparison() {
        let day = |s: &str| parse_datetime_millis(s).unwrap();
        let ds = Dataset::from_columns(vec![
            (
                "when",
                Arc::new(TimestampMillisecondArray::from(vec![day("2024-01-01"), day("2024-02-01")])) as ArrayRef,
            ),
            ("v", Arc::new(Float64Array::from(vec![1.0, 2.0])) as ArrayRef),
        ])
        .unwrap();
        let out = apply(&ds, &[cond("when", FilterOperator::Gt, "2024-01-15")]).unwrap();
        assert_eq!(out.cells("v").unwrap(), vec![Cell::from(2.0)]);
    }

    #[test]
    fn test_list_with_scalar_operator_matches_nothing() {
        let list = FilterValue::List(vec![Cell::from("east")]);
        let out = apply(&sales(), &[cond("region", FilterOperator::Eq, list.clone())]).unwrap();
        assert_eq!(out.num_rows(), 0);
        let out = apply(&sales(), &[cond("region", FilterOperator::NotEq, list)]).unwrap();
        assert_eq!(out.num_rows(), 4);
    }
}
