//! Filter predicates for WHERE clauses.
//!
//! Leaf comparisons coerce their value through the column, so type errors
//! surface when the filter is built rather than when it is executed.
//!
//! ```ignore
//! // Function style
//! Filter::and([Filter::eq(&brand, "Ford")?, Filter::gt(&price, 10_000)?])
//!
//! // Operator style (via std::ops traits)
//! Filter::eq(&brand, "Ford")? & Filter::gt(&price, 10_000)?
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

use crate::column::Column;
use crate::error::ValueError;
use crate::escape::{escape_identifier, escape_literal};
use crate::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

impl CompareOp {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// `column op value` with an already coerced value
#[derive(Debug, Clone)]
pub struct Comparison {
    column: Arc<Column>,
    op: CompareOp,
    value: Value,
}

impl Comparison {
    pub fn column(&self) -> &Column {
        &self.column
    }

    pub const fn op(&self) -> CompareOp {
        self.op
    }

    pub const fn value(&self) -> &Value {
        &self.value
    }

    fn to_sql(&self) -> String {
        let column = escape_identifier(self.column.name());
        match (self.op, &self.value) {
            (CompareOp::Equal, Value::Null) => format!("{column} IS NULL"),
            (CompareOp::NotEqual, Value::Null) => format!("{column} IS NOT NULL"),
            (op, value) => format!("{column} {op} {}", escape_literal(value)),
        }
    }
}

/// A boolean predicate tree
#[derive(Debug, Clone)]
pub enum Filter {
    Compare(Comparison),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn compare(
        column: &Arc<Column>,
        op: CompareOp,
        value: impl Into<Value>,
    ) -> Result<Self, ValueError> {
        Ok(Self::Compare(Comparison {
            column: Arc::clone(column),
            op,
            value: column.parse_value(value)?,
        }))
    }

    pub fn eq(column: &Arc<Column>, value: impl Into<Value>) -> Result<Self, ValueError> {
        Self::compare(column, CompareOp::Equal, value)
    }

    pub fn ne(column: &Arc<Column>, value: impl Into<Value>) -> Result<Self, ValueError> {
        Self::compare(column, CompareOp::NotEqual, value)
    }

    pub fn gt(column: &Arc<Column>, value: impl Into<Value>) -> Result<Self, ValueError> {
        Self::compare(column, CompareOp::GreaterThan, value)
    }

    pub fn lt(column: &Arc<Column>, value: impl Into<Value>) -> Result<Self, ValueError> {
        Self::compare(column, CompareOp::LessThan, value)
    }

    pub fn ge(column: &Arc<Column>, value: impl Into<Value>) -> Result<Self, ValueError> {
        Self::compare(column, CompareOp::GreaterOrEqual, value)
    }

    pub fn le(column: &Arc<Column>, value: impl Into<Value>) -> Result<Self, ValueError> {
        Self::compare(column, CompareOp::LessOrEqual, value)
    }

    /// Logical AND of `filters`. Without children it matches every row.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Logical OR of `filters`. Without children it matches every row.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Append a child. A comparison is first wrapped into an AND.
    pub fn push(&mut self, filter: Filter) {
        match self {
            Self::And(children) | Self::Or(children) => children.push(filter),
            Self::Compare(_) => {
                let first = std::mem::replace(self, Self::And(Vec::with_capacity(2)));
                if let Self::And(children) = self {
                    children.extend([first, filter]);
                }
            }
        }
    }

    /// Number of direct children; a comparison counts as one
    pub fn len(&self) -> usize {
        match self {
            Self::Compare(_) => 1,
            Self::And(children) | Self::Or(children) => children.len(),
        }
    }

    /// True when the filter renders to nothing
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Compare(_) => false,
            Self::And(children) | Self::Or(children) => children.iter().all(Self::is_empty),
        }
    }

    /// The predicate without the `WHERE` keyword. Empty when [`is_empty`](Self::is_empty).
    pub fn to_sql(&self) -> String {
        self.render(true)
    }

    fn render(&self, root: bool) -> String {
        let (children, separator) = match self {
            Self::Compare(comparison) => return comparison.to_sql(),
            Self::And(children) => (children, " AND "),
            Self::Or(children) => (children, " OR "),
        };

        let parts: Vec<String> = children
            .iter()
            .filter(|child| !child.is_empty())
            .map(|child| child.render(false))
            .collect();

        match parts.as_slice() {
            [] => String::new(),
            _ if root => parts.join(separator),
            _ => format!("({})", parts.join(separator)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

// =============================================================================
// Operator Trait Implementations
// =============================================================================

/// `a & b` extends an existing AND instead of nesting it
impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Self) -> Self::Output {
        match self {
            Self::And(mut children) => {
                children.push(rhs);
                Self::And(children)
            }
            lhs => Self::And(vec![lhs, rhs]),
        }
    }
}

/// `a | b` extends an existing OR instead of nesting it
impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Self) -> Self::Output {
        match self {
            Self::Or(mut children) => {
                children.push(rhs);
                Self::Or(children)
            }
            lhs => Self::Or(vec![lhs, rhs]),
        }
    }
}
