//! Params module - utilities for converting JSON values to SQLite parameters

use crate::error::{RecordError, Result};
use rusqlite::ToSql;
use serde_json::Value;

/// Convert bound values to SQLite parameters
///
/// # Arguments
/// * `values` - Slice of JSON values, in placeholder order
///
/// # Returns
/// Vector of boxed traits that implement ToSql
///
/// # Errors
/// `RecordError::Validation` if any value cannot be stored, see
/// [`convert_single_param`]
pub fn convert_params(values: &[Value]) -> Result<Vec<Box<dyn ToSql>>> {
    values.iter().map(convert_single_param).collect()
}

/// Convert a single JSON scalar to a SQLite parameter
///
/// Booleans are stored as 0/1, integers that fit `i64` as INTEGER, fractional
/// numbers as REAL.
///
/// # Arguments
/// * `v` - JSON value to convert
///
/// # Returns
/// Boxed trait that implements ToSql
///
/// # Errors
/// `RecordError::Validation` for arrays, objects, and integers above `i64::MAX`
/// (SQLite INTEGER is signed 64-bit; storing them as REAL would lose digits)
pub fn convert_single_param(v: &Value) -> Result<Box<dyn ToSql>> {
    match v {
        Value::Null => Ok(Box::new(rusqlite::types::Null)),
        Value::Bool(b) => Ok(Box::new(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Box::new(i))
            } else if n.is_u64() {
                Err(RecordError::validation(format!(
                    "integer {} exceeds the 64-bit signed range",
                    n
                )))
            } else if let Some(f) = n.as_f64() {
                Ok(Box::new(f))
            } else {
                Err(RecordError::validation(format!(
                    "number {} cannot be stored",
                    n
                )))
            }
        }
        Value::String(s) => Ok(Box::new(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(RecordError::validation(format!(
            "only scalar values can be bound, got {}",
            v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_convert() {
        let params = convert_params(&[json!(null), json!(true), json!(7), json!(1.5), json!("x")]);
        assert_eq!(params.unwrap().len(), 5);
    }

    #[test]
    fn test_non_scalars_rejected() {
        assert!(convert_single_param(&json!([1, 2])).err().unwrap().is_validation());
        assert!(convert_single_param(&json!({"a": 1})).err().unwrap().is_validation());
    }

    #[test]
    fn test_integer_range() {
        assert!(convert_single_param(&json!(i64::MAX)).is_ok());
        assert!(convert_single_param(&json!(i64::MIN)).is_ok());
        assert!(convert_single_param(&json!(u64::MAX)).err().unwrap().is_validation());
        assert!(convert_single_param(&json!(i64::MAX as u64 + 1))
            .err()
            .unwrap()
            .is_validation());
        assert!(convert_single_param(&json!(1.0e300)).is_ok());
    }
}
