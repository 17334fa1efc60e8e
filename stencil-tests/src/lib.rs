mod batch;
mod fixtures;
mod identity;
mod join;
mod keys;
mod mock;
mod modify;
mod multiple;
mod paging;
mod select;

pub use fixtures::*;
pub use mock::*;

use crate::{
    batch::batch,
    identity::{identity, trigger_identity},
    join::join,
    keys::{assigned_keys, composite_keys, conventional_keys, guid_keys},
    modify::modify,
    multiple::multiple,
    paging::paging,
    select::select,
};
use log::LevelFilter;
use std::{env, sync::Arc};
use stencil::{Configuration, Repository, SqlWriter, StencilError, TableRef};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Repository over `dialect` with the default configuration.
pub fn repository<D: SqlWriter + Clone + 'static>(dialect: &D) -> Repository {
    Repository::new(Arc::new(
        Configuration::builder().dialect(dialect.clone()).build(),
    ))
}

/// Whether `dialect` can read back identity generated keys.
pub fn supports_identity(dialect: &dyn SqlWriter) -> bool {
    let mut sql = String::new();
    dialect
        .write_identity_select(&mut sql, &TableRef::new("identity_check"))
        .is_ok()
}

/// Kind of a failure produced by the library.
pub fn error_kind(error: &stencil::Error) -> Option<&StencilError> {
    error.downcast_ref::<StencilError>()
}

/// Runs every shared scenario against `dialect`.
pub async fn execute_tests<D: SqlWriter + Clone + 'static>(dialect: D) {
    identity(&dialect).await;
    trigger_identity(&dialect).await;
    guid_keys(&dialect).await;
    assigned_keys(&dialect).await;
    composite_keys(&dialect).await;
    conventional_keys(&dialect).await;
    select(&dialect).await;
    paging(&dialect).await;
    batch(&dialect).await;
    modify(&dialect).await;
    join(&dialect).await;
    multiple(&dialect).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
