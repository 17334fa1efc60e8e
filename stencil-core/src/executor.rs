use crate::{
    Query, QueryResult, Result, RowLabeled, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

/// Connection to the database, as seen by the repository.
///
/// Implementations only provide [`Executor::run`]; everything else is derived from the
/// stream it returns. See [`QueryResult`] for the shape of that stream.
pub trait Executor: Send + Sized {
    /// General method to send any query and return any result type (rows, counts,
    /// output parameters).
    fn run(&mut self, query: Query) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the query and returns the rows.
    fn fetch(&mut self, query: Query) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(query).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the query and return the total number of rows affected.
    fn execute(&mut self, query: Query) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(query)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    /// Execute the query and collect everything it produced.
    fn collect(&mut self, query: Query) -> impl Future<Output = Result<Vec<QueryResult>>> + Send {
        self.run(query).try_collect()
    }
}
