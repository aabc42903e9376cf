//! Node.js binding - exposes RecordStore as a JavaScript class via NAPI
//!
//! Conditions and records cross the boundary as JSON values; see
//! [`crate::condition`] for the condition format.

use crate::config::ConnectionConfig;
use crate::error::to_napi_error;
use crate::logging::LoggingConfig;
use crate::{Condition, Ident, OrderBy, Page, Record, RecordStore};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use serde_json::Value;

/// Connection options, all optional
#[napi(object)]
pub struct StoreOptions {
    pub read_only: Option<bool>,
    pub journal_mode: Option<String>,
    pub synchronous: Option<String>,
    pub foreign_keys: Option<bool>,
    pub busy_timeout_ms: Option<u32>,
}

impl StoreOptions {
    fn into_config(self, path: String) -> ConnectionConfig {
        let defaults = ConnectionConfig::new(path);
        ConnectionConfig {
            read_only: self.read_only.unwrap_or(defaults.read_only),
            journal_mode: self.journal_mode.unwrap_or(defaults.journal_mode),
            synchronous: self.synchronous.unwrap_or(defaults.synchronous),
            foreign_keys: self.foreign_keys.unwrap_or(defaults.foreign_keys),
            busy_timeout_ms: self.busy_timeout_ms.unwrap_or(defaults.busy_timeout_ms),
            path: defaults.path,
        }
    }
}

/// Record store class - one SQLite connection with CRUD helpers
#[napi(js_name = "RecordStore")]
pub struct JsRecordStore {
    inner: RecordStore,
}

#[napi]
impl JsRecordStore {
    /// Open a database file (or ":memory:")
    #[napi(constructor)]
    pub fn new(path: String, options: Option<StoreOptions>) -> Result<Self> {
        let config = match options {
            Some(options) => options.into_config(path),
            None => ConnectionConfig::new(path),
        };
        let inner = RecordStore::open(&config).map_err(to_napi_error)?;
        Ok(JsRecordStore { inner })
    }

    /// Execute trusted SQL from the host application (schema setup)
    #[napi]
    pub fn exec(&self, sql: String) -> Result<()> {
        self.inner.execute_batch(&sql).map_err(to_napi_error)
    }

    #[napi]
    pub fn select_all(&self, table: String) -> Result<Vec<Value>> {
        let rows = self.inner.select_all(&ident(table)?).map_err(to_napi_error)?;
        Ok(into_values(rows))
    }

    #[napi]
    pub fn select_all_where(&self, table: String, condition: Value) -> Result<Vec<Value>> {
        let rows = self
            .inner
            .select_all_where(&ident(table)?, &parse_condition(condition)?)
            .map_err(to_napi_error)?;
        Ok(into_values(rows))
    }

    /// Insert a record and return its row id
    #[napi]
    pub fn insert(&self, table: String, record: Value) -> Result<i64> {
        self.inner
            .insert(&ident(table)?, &parse_record(record)?)
            .map_err(to_napi_error)
    }

    #[napi]
    pub fn update(&self, table: String, record: Value, condition: Value) -> Result<u32> {
        let changes = self
            .inner
            .update(
                &ident(table)?,
                &parse_record(record)?,
                &parse_condition(condition)?,
            )
            .map_err(to_napi_error)?;
        changes_to_js(changes)
    }

    #[napi]
    pub fn delete(&self, table: String, condition: Value) -> Result<u32> {
        let changes = self
            .inner
            .delete(&ident(table)?, &parse_condition(condition)?)
            .map_err(to_napi_error)?;
        changes_to_js(changes)
    }

    #[napi]
    pub fn count(&self, table: String, condition: Option<Value>) -> Result<i64> {
        let condition = condition.map(parse_condition).transpose()?;
        self.inner
            .count(&ident(table)?, condition.as_ref())
            .map_err(to_napi_error)
    }

    /// Page through rows; limit defaults to 10, offset to 0.
    /// `orderBy` is `{ column, order: "asc" | "desc" }`.
    #[napi]
    pub fn search(
        &self,
        table: String,
        condition: Option<Value>,
        limit: Option<u32>,
        offset: Option<u32>,
        order_by: Option<Value>,
    ) -> Result<Vec<Value>> {
        let condition = condition.map(parse_condition).transpose()?;
        let mut page = Page::default();
        if let Some(limit) = limit {
            page.limit = limit;
        }
        if let Some(offset) = offset {
            page.offset = offset;
        }
        if let Some(order_by) = order_by {
            page.order_by = Some(serde_json::from_value::<OrderBy>(order_by).map_err(invalid_arg)?);
        }
        let rows = self
            .inner
            .search(&ident(table)?, condition.as_ref(), &page)
            .map_err(to_napi_error)?;
        Ok(into_values(rows))
    }

    /// First matching row, or null
    #[napi]
    pub fn fetch_one(&self, table: String, condition: Value) -> Result<Value> {
        let row = self
            .inner
            .fetch_one(&ident(table)?, &parse_condition(condition)?)
            .map_err(to_napi_error)?;
        Ok(row.map(Value::Object).unwrap_or(Value::Null))
    }

    #[napi]
    pub fn bulk_insert(&self, table: String, rows: Vec<Value>) -> Result<u32> {
        let rows = rows
            .into_iter()
            .map(parse_record)
            .collect::<Result<Vec<_>>>()?;
        let changes = self
            .inner
            .bulk_insert(&ident(table)?, &rows)
            .map_err(to_napi_error)?;
        changes_to_js(changes)
    }
}

#[napi]
pub fn get_sqlite_version() -> String {
    crate::sqlite_version().to_string()
}

/// Install a log subscriber; `filter` is used when RUST_LOG is unset.
/// Returns false if one was already installed.
#[napi]
pub fn init_logging(filter: Option<String>) -> bool {
    let config = LoggingConfig::from_env();
    match filter {
        Some(filter) => config.with_level(filter).init(),
        None => config.init(),
    }
}

fn ident(name: String) -> Result<Ident> {
    Ident::new(name).map_err(to_napi_error)
}

fn parse_condition(value: Value) -> Result<Condition> {
    serde_json::from_value(value).map_err(invalid_arg)
}

fn parse_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::new(
            Status::InvalidArg,
            format!("Validation Error: record must be an object, got {}", other),
        )),
    }
}

fn into_values(rows: Vec<Record>) -> Vec<Value> {
    rows.into_iter().map(Value::Object).collect()
}

/// Row counts cross to JS as u32; larger counts are reported instead of wrapped
fn changes_to_js(changes: usize) -> Result<u32> {
    u32::try_from(changes).map_err(|_| {
        Error::new(
            Status::GenericFailure,
            format!("{} rows changed, more than a u32 can report", changes),
        )
    })
}

fn invalid_arg(err: serde_json::Error) -> Error {
    Error::new(Status::InvalidArg, format!("Validation Error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_to_js_range() {
        assert_eq!(changes_to_js(3).unwrap(), 3);
        assert_eq!(changes_to_js(u32::MAX as usize).unwrap(), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert!(changes_to_js(u32::MAX as usize + 1).is_err());
    }
}
