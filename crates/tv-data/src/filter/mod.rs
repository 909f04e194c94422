//! Declarative filter conditions and their safe evaluation

pub mod evaluator;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tv_core::{Cell, CoreError};

pub use evaluator::{apply, FilterEvaluator};

/// Comparison operators accepted in filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    In,
    NotIn,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 8] = [
        FilterOperator::Eq,
        FilterOperator::NotEq,
        FilterOperator::Gt,
        FilterOperator::Lt,
        FilterOperator::GtEq,
        FilterOperator::LtEq,
        FilterOperator::In,
        FilterOperator::NotIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "==",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::GtEq => ">=",
            FilterOperator::LtEq => "<=",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not in",
        }
    }

    /// `in` / `not in` test set membership; everything else compares a scalar
    pub fn is_membership(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedOperator(s.to_string()))
    }
}

/// Right-hand side of a condition: a scalar, a list of scalars, or a
/// comma-delimited string (for membership operators)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<Cell>),
    Scalar(Cell),
}

impl FilterValue {
    /// Normalise to a membership list: lists are kept, strings are split on
    /// `,` with each item trimmed, any other scalar yields an empty list.
    pub fn to_list(&self) -> Vec<Cell> {
        match self {
            FilterValue::List(items) => items.clone(),
            FilterValue::Scalar(Cell::Text(text)) => text
                .split(',')
                .map(|item| Cell::Text(item.trim().to_string()))
                .collect(),
            FilterValue::Scalar(_) => Vec::new(),
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Scalar(Cell::Missing)
    }
}

impl From<Cell> for FilterValue {
    fn from(value: Cell) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<Vec<Cell>> for FilterValue {
    fn from(values: Vec<Cell>) -> Self {
        FilterValue::List(values)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(Cell::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Scalar(Cell::Number(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Scalar(Cell::from(value))
    }
}

/// A single column/operator/value predicate.
///
/// The operator is kept as decoded so that persisted or externally produced
/// conditions round-trip unchanged; it is validated at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub column: String,
    pub operator: String,
    #[serde(default)]
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            operator: operator.as_str().to_string(),
            value: value.into(),
        }
    }

    /// Parsed operator, failing with `UnsupportedOperator` outside the whitelist
    pub fn operator(&self) -> Result<FilterOperator, CoreError> {
        self.operator.parse()
    }
}

/// Ordered, AND-combined list of conditions
pub type FilterSet = Vec<FilterCondition>;
