//! Store module - the RecordStore struct wrapping one SQLite connection

use crate::condition::Condition;
use crate::config::ConnectionConfig;
use crate::db::sql::{self, SqlStatement};
use crate::db::{convert_params, row_to_record};
use crate::error::{RecordError, Result};
use crate::ident::Ident;
use crate::models::{Page, Record};
use rusqlite::{Connection, OpenFlags, ToSql};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Record access helper - one connection, a fixed set of CRUD operations
///
/// Cloning shares the same connection; calls serialize on its mutex.
#[derive(Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    /// Open a connection and apply the configured PRAGMAs
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else if config.read_only {
            Connection::open_with_flags(
                &config.path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            Connection::open(&config.path)?
        };

        // Enable extended result codes for better error handling
        conn.execute_batch("PRAGMA extended_result_codes = ON")?;

        conn.busy_timeout(Duration::from_millis(u64::from(config.busy_timeout_ms)))?;
        if !config.read_only {
            let mode: String = conn.pragma_update_and_check(
                None,
                "journal_mode",
                config.journal_mode.to_ascii_uppercase(),
                |row| row.get(0),
            )?;
            debug!(journal_mode = %mode, "journal mode set");
        }
        conn.pragma_update(None, "synchronous", config.synchronous.to_ascii_uppercase())?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;

        info!(path = %config.path, read_only = config.read_only, "record store opened");

        Ok(RecordStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(&ConnectionConfig::in_memory())
    }

    /// Open using `RECORDS_DB_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::open(&ConnectionConfig::from_env()?)
    }

    /// Run caller-written SQL statements, e.g. schema setup.
    ///
    /// `sql` is executed verbatim and must come from the hosting application,
    /// never from end-user input.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.lock()?;
        debug!("executing trusted batch");
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Every row of `table`
    pub fn select_all(&self, table: &Ident) -> Result<Vec<Record>> {
        self.query_records(table, &sql::select(table, None))
    }

    /// Rows of `table` matching `condition`
    pub fn select_all_where(&self, table: &Ident, condition: &Condition) -> Result<Vec<Record>> {
        self.query_records(table, &sql::select(table, Some(condition)))
    }

    /// Insert one record and return its row id
    ///
    /// # Errors
    /// `Validation` for an empty record, a bad column name or a non-scalar
    /// value; `Query` when the database rejects the row.
    pub fn insert(&self, table: &Ident, record: &Record) -> Result<i64> {
        let stmt = sql::insert(table, record)?;
        let conn = self.lock()?;
        execute(&conn, table, &stmt)?;
        Ok(conn.last_insert_rowid())
    }

    /// Set the columns of `record` on every row matching `condition`
    ///
    /// Use [`Condition::all`] to update every row.
    pub fn update(&self, table: &Ident, record: &Record, condition: &Condition) -> Result<usize> {
        let stmt = sql::update(table, record, condition)?;
        let conn = self.lock()?;
        execute(&conn, table, &stmt)
    }

    /// Delete rows matching `condition`
    ///
    /// Use [`Condition::all`] to delete every row.
    pub fn delete(&self, table: &Ident, condition: &Condition) -> Result<usize> {
        let conn = self.lock()?;
        execute(&conn, table, &sql::delete(table, condition))
    }

    /// Number of rows, optionally filtered
    pub fn count(&self, table: &Ident, condition: Option<&Condition>) -> Result<i64> {
        let stmt = sql::count(table, condition);
        let params = convert_params(&stmt.params)?;
        let conn = self.lock()?;
        debug!(table = %table, sql = %stmt.sql, "count");
        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        let count = prepared.query_row(param_refs(&params).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// One page of rows, optionally filtered and ordered
    pub fn search(
        &self,
        table: &Ident,
        condition: Option<&Condition>,
        page: &Page,
    ) -> Result<Vec<Record>> {
        self.query_records(table, &sql::search(table, condition, page))
    }

    /// First row matching `condition`, `None` when nothing matches
    pub fn fetch_one(&self, table: &Ident, condition: &Condition) -> Result<Option<Record>> {
        Ok(self
            .query_records(table, &sql::fetch_one(table, condition))?
            .into_iter()
            .next())
    }

    /// Insert all `rows` with a single statement and return the rows affected
    ///
    /// # Errors
    /// `Validation` before anything is written when `rows` is empty or the rows
    /// do not share one column set; `Query` if the statement fails, in which
    /// case no row is written.
    pub fn bulk_insert(&self, table: &Ident, rows: &[Record]) -> Result<usize> {
        let stmt = sql::bulk_insert(table, rows)?;
        let conn = self.lock()?;
        execute(&conn, table, &stmt)
    }

    fn query_records(&self, table: &Ident, stmt: &SqlStatement) -> Result<Vec<Record>> {
        let params = convert_params(&stmt.params)?;
        let conn = self.lock()?;
        debug!(table = %table, sql = %stmt.sql, "query");

        let mut prepared = conn.prepare_cached(&stmt.sql)?;
        let column_names: Vec<String> = prepared
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = prepared.query(param_refs(&params).as_slice())?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(row_to_record(row, &column_names)?);
        }
        Ok(results)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RecordError::LockPoisoned)
    }
}

fn execute(conn: &Connection, table: &Ident, stmt: &SqlStatement) -> Result<usize> {
    let params = convert_params(&stmt.params)?;
    debug!(table = %table, sql = %stmt.sql, "execute");
    let mut prepared = conn.prepare_cached(&stmt.sql)?;
    let changes = prepared.execute(param_refs(&params).as_slice())?;
    Ok(changes)
}

fn param_refs(params: &[Box<dyn ToSql>]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p.as_ref()).collect()
}
