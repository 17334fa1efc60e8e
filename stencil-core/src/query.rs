use crate::{ParameterBag, Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// Generated SQL text with its bound parameters, ready for an [`Executor`](crate::Executor).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: ParameterBag,
}

impl Query {
    pub fn new(sql: String, params: ParameterBag) -> Self {
        Self { sql, params }
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Query {
            sql: value,
            params: Default::default(),
        }
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        for param in self.params.iter() {
            writeln!(f, "  {} = {}", param.name, param.value)?;
        }
        Ok(())
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    /// Column lookup, case insensitive: engines disagree on the case of unquoted labels.
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v.eq_ignore_ascii_case(name))
            .map(|i| &self.values()[i])
    }
    pub fn into_first(self) -> Option<Value> {
        self.values.into_iter().next()
    }
}

/// Heterogeneous items emitted by `Executor::run`.
///
/// For every statement of the query the executor yields its rows followed by one
/// `Affected`, which therefore also delimits result sets in a batch. Output parameters
/// are reported with `Output` once the statement producing them completed.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A labeled row.
    Row(RowLabeled),
    /// End of a statement, with the rows it modified.
    Affected(RowsAffected),
    /// Value written by the engine into an output parameter.
    Output(String, Value),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
        }
    }
}

impl From<RowLabeled> for QueryResult {
    fn from(value: RowLabeled) -> Self {
        QueryResult::Row(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}
