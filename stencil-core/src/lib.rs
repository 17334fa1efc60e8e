mod as_value;
mod config;
mod entity;
mod error;
mod executor;
mod id;
mod join;
mod key;
mod multiple;
mod parameter;
mod predicate;
mod query;
mod repository;
mod schema;
mod table_ref;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use id::*;
pub use join::{JoinType, JoinedRow, Relations};
pub use key::*;
pub use multiple::{MultipleQuery, MultipleResultReader};
pub use parameter::*;
pub use predicate::*;
pub use query::*;
pub use repository::*;
pub use schema::*;
pub use table_ref::*;
pub use util::*;
pub use value::*;
pub use writer::{Aggregate, GenericSqlWriter, ID_OUT_PARAM, SqlWriter, relational_label};
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
