//! Record access helper over SQLite
//!
//! [`RecordStore`] holds one connection and offers select / insert / update /
//! delete / count / search / fetch-one / bulk-insert operations keyed by
//! validated [`Ident`]s and structured [`Condition`]s. Values are always bound
//! parameters. With the `node` feature the store is also exported to
//! JavaScript.

#[cfg(feature = "node")]
mod binding;
pub mod condition;
pub mod config;
pub mod db;
mod error;
pub mod ident;
pub mod logging;
mod models;

pub use condition::Condition;
pub use config::ConnectionConfig;
pub use db::{RecordStore, SqlStatement};
pub use error::{RecordError, Result};
pub use ident::{is_valid_ident, Ident};
pub use models::{OrderBy, Page, Record, SortOrder, DEFAULT_PAGE_LIMIT};

/// Version of the linked SQLite library
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}
