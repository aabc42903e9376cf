//! Database module - SQLite record access

mod params;
mod row;
pub mod sql;
mod store;

pub use params::{convert_params, convert_single_param};
pub use row::{row_to_record, sqlite_to_json};
pub use sql::SqlStatement;
pub use store::RecordStore;
