use std::sync::Arc;
use stencil::{
    Executor, Query, QueryResult, Result, RowLabeled, RowsAffected, Value,
    stream::{self, Stream},
};

type Handler = Box<dyn FnMut(&Query) -> Result<Vec<QueryResult>> + Send>;

/// Executor answering every query with a scripted handler and recording what it was
/// sent.
///
/// The handler reproduces the stream shape of a real driver: for each statement the
/// rows, then one `Affected`, plus `Output` items for bound output parameters.
pub struct MockExecutor {
    handler: Handler,
    queries: Vec<Query>,
}

impl MockExecutor {
    pub fn new(handler: impl FnMut(&Query) -> Result<Vec<QueryResult>> + Send + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            queries: Vec::new(),
        }
    }

    /// Every statement affects one row and returns nothing.
    pub fn affecting_one() -> Self {
        Self::new(|query| Ok(vec![affected(1); statements(query)]))
    }

    /// Every query replays `results`.
    pub fn replaying(results: Vec<QueryResult>) -> Self {
        Self::new(move |_| Ok(results.clone()))
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn last(&self) -> Option<&Query> {
        self.queries.last()
    }

    pub fn last_sql(&self) -> &str {
        self.last().map(|q| q.sql.as_str()).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.queries.clear();
    }
}

impl Executor for MockExecutor {
    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send {
        let results: Vec<Result<QueryResult>> = match (self.handler)(&query) {
            Ok(v) => v.into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        self.queries.push(query);
        stream::iter(results)
    }
}

/// Number of statements in a batch, counting top level separators.
pub fn statements(query: &Query) -> usize {
    query.sql.matches(";\n").count() + 1
}

pub fn row(labels: &[&str], values: impl IntoIterator<Item = Value>) -> QueryResult {
    QueryResult::Row(RowLabeled::new(
        labels.iter().map(|v| v.to_string()).collect::<Arc<[String]>>(),
        values.into_iter().collect(),
    ))
}

pub fn affected(rows_affected: u64) -> QueryResult {
    QueryResult::Affected(RowsAffected { rows_affected })
}

pub fn output(name: &str, value: impl Into<Value>) -> QueryResult {
    QueryResult::Output(name.into(), value.into())
}
