//! Row module - utilities for converting SQLite rows to records

use crate::models::Record;
use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde_json::{Number, Value};

/// Convert one SQLite column to a JSON value
///
/// Non-finite reals become null and blobs become base64 text.
///
/// # Arguments
/// * `row` - Reference to the SQLite row
/// * `i` - Column index
///
/// # Returns
/// JSON value representing the SQLite column value
pub fn sqlite_to_json(row: &Row, i: usize) -> rusqlite::Result<Value> {
    Ok(match row.get_ref(i)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
    })
}

/// Convert a whole row to a record keyed by `column_names`
///
/// # Arguments
/// * `row` - Reference to the SQLite row
/// * `column_names` - Statement column names, in column order
///
/// # Returns
/// Record with one entry per column, in the same order
pub fn row_to_record(row: &Row, column_names: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        record.insert(name.clone(), sqlite_to_json(row, i)?);
    }
    Ok(record)
}
