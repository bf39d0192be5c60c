//! Composable predicate values over stored attributes.
//!
//! Filters are plain data: a tree of comparisons on [`Column`]s joined with
//! `&`, `|` and `!`. Because a filter names the tables it touches, the store
//! can validate it and derive the joins it needs before running anything.

use std::{
    collections::BTreeSet,
    fmt,
    ops::{BitAnd, BitOr, Not},
    str::FromStr,
};

use chrono::NaiveDate;
use thiserror::Error;

use crate::Table;

/// Reference to a stored attribute, e.g. `Route.route_short_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    table: Table,
    name: String,
}

impl Column {
    /// Reference `name` on `table`. The name is checked by [`Column::validate`].
    pub fn new(table: Table, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
        }
    }

    /// Table holding the attribute.
    pub const fn table(&self) -> Table {
        self.table
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ensure the attribute exists in the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownColumn`] when it does not.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.table.has_column(&self.name) {
            Ok(())
        } else {
            Err(FilterError::UnknownColumn {
                table: self.table,
                column: self.name.clone(),
            })
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

impl FromStr for Column {
    type Err = FilterError;

    /// Parse a `Table.column` path and validate it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (table, name) = s
            .split_once('.')
            .ok_or_else(|| FilterError::MalformedColumn(s.to_owned()))?;
        let table = table
            .trim()
            .parse::<Table>()
            .map_err(|err| FilterError::UnknownTable(err.0))?;
        let column = Self::new(table, name.trim());
        column.validate()?;
        Ok(column)
    }
}

/// A literal compared against an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Integers, booleans and enum codes.
    Integer(i64),
    /// Floating-point values such as coordinates.
    Real(f64),
    /// Identifiers and free text.
    Text(String),
    /// Stored as an ISO-8601 `YYYY-MM-DD` string, so ordering is preserved.
    Date(NaiveDate),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    /// SQL spelling of the operator.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A boolean predicate over entity attributes.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use transitdb_core::{Filter, Table};
///
/// let date = NaiveDate::from_ymd_opt(2016, 1, 22).expect("valid date");
/// let filter = Filter::eq(Table::Route.col("route_short_name"), "R1")
///     & Filter::eq(Table::CalendarDate.col("date"), date);
///
/// assert!(filter.validate().is_ok());
/// assert_eq!(filter.tables().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column <op> value`.
    Compare {
        /// Attribute on the left-hand side.
        column: Column,
        /// Comparison operator.
        op: Comparison,
        /// Literal on the right-hand side.
        value: Value,
    },
    /// Inclusive range test.
    Between {
        /// Attribute tested.
        column: Column,
        /// Lower bound.
        low: Value,
        /// Upper bound.
        high: Value,
    },
    /// Membership in a literal set. An empty set matches nothing.
    OneOf {
        /// Attribute tested.
        column: Column,
        /// Accepted literals.
        values: Vec<Value>,
    },
    /// The attribute is unset.
    IsNull(Column),
    /// Conjunction; empty matches everything.
    And(Vec<Filter>),
    /// Disjunction; empty matches nothing.
    Or(Vec<Filter>),
    /// Negation.
    Not(Box<Filter>),
}

impl Filter {
    fn compare(column: Column, op: Comparison, value: impl Into<Value>) -> Self {
        Self::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(column: Column, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Eq, value)
    }

    /// `column <> value`
    pub fn ne(column: Column, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Ne, value)
    }

    /// `column < value`
    pub fn lt(column: Column, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Lt, value)
    }

    /// `column <= value`
    pub fn le(column: Column, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Le, value)
    }

    /// `column > value`
    pub fn gt(column: Column, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Gt, value)
    }

    /// `column >= value`
    pub fn ge(column: Column, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Ge, value)
    }

    /// `low <= column <= high`
    pub fn between(column: Column, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::Between {
            column,
            low: low.into(),
            high: high.into(),
        }
    }

    /// `column IN (values…)`
    pub fn one_of<I, V>(column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::OneOf {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `column IS NULL`
    pub const fn is_null(column: Column) -> Self {
        Self::IsNull(column)
    }

    /// Conjunction of every filter in `filters`.
    pub fn all<I: IntoIterator<Item = Self>>(filters: I) -> Self {
        filters.into_iter().fold(Self::And(Vec::new()), BitAnd::bitand)
    }

    /// Disjunction of every filter in `filters`.
    pub fn any<I: IntoIterator<Item = Self>>(filters: I) -> Self {
        filters.into_iter().fold(Self::Or(Vec::new()), BitOr::bitor)
    }

    /// Tables referenced anywhere in the predicate.
    pub fn tables(&self) -> BTreeSet<Table> {
        let mut tables = BTreeSet::new();
        self.visit_columns(&mut |column| {
            tables.insert(column.table());
        });
        tables
    }

    /// Check every referenced attribute against the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownColumn`] for the first unknown attribute.
    pub fn validate(&self) -> Result<(), FilterError> {
        let mut outcome = Ok(());
        self.visit_columns(&mut |column| {
            if outcome.is_ok() {
                outcome = column.validate();
            }
        });
        outcome
    }

    /// Validate the predicate and ensure it only reaches the `allowed` tables.
    ///
    /// `axis` names the query parameter the filter was passed through and is
    /// reported back in the error.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownColumn`] as [`Filter::validate`] does,
    /// and [`FilterError::OutOfScope`] for the first disallowed table.
    pub fn validate_scope(&self, axis: &'static str, allowed: &[Table]) -> Result<(), FilterError> {
        self.validate()?;
        match self.tables().into_iter().find(|table| !allowed.contains(table)) {
            Some(table) => Err(FilterError::OutOfScope { axis, table }),
            None => Ok(()),
        }
    }

    fn visit_columns(&self, visit: &mut impl FnMut(&Column)) {
        match self {
            Self::Compare { column, .. }
            | Self::Between { column, .. }
            | Self::OneOf { column, .. }
            | Self::IsNull(column) => visit(column),
            Self::And(filters) | Self::Or(filters) => {
                for filter in filters {
                    filter.visit_columns(visit);
                }
            }
            Self::Not(inner) => inner.visit_columns(visit),
        }
    }
}

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::And(mut lhs), Self::And(rhs)) => {
                lhs.extend(rhs);
                Self::And(lhs)
            }
            (Self::And(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::And(lhs)
            }
            (lhs, Self::And(mut rhs)) => {
                rhs.insert(0, lhs);
                Self::And(rhs)
            }
            (lhs, rhs) => Self::And(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Or(mut lhs), Self::Or(rhs)) => {
                lhs.extend(rhs);
                Self::Or(lhs)
            }
            (Self::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::Or(lhs)
            }
            (lhs, Self::Or(mut rhs)) => {
                rhs.insert(0, lhs);
                Self::Or(rhs)
            }
            (lhs, rhs) => Self::Or(vec![lhs, rhs]),
        }
    }
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

/// Errors raised while validating a filter at query construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A column path was not of the form `Table.column`.
    #[error("malformed column path {0:?}; expected Table.column")]
    MalformedColumn(String),
    /// The table part of a column path is not part of the schema.
    #[error("unknown table {0:?}")]
    UnknownTable(String),
    /// The attribute does not exist on the table.
    #[error("{table} has no attribute {column:?}")]
    UnknownColumn {
        /// Table named by the path.
        table: Table,
        /// Attribute that was not found.
        column: String,
    },
    /// The filter reaches a table its query parameter cannot join to.
    #[error("{axis} cannot reference {table}")]
    OutOfScope {
        /// Query parameter holding the filter.
        axis: &'static str,
        /// Table the filter reached for.
        table: Table,
    },
}
