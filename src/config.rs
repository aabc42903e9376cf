//! Connection configuration
//!
//! Describes which database file to open and the PRAGMAs applied right after
//! opening. Can be built in code, deserialized from a host application's
//! config, or read from `RECORDS_DB_*` environment variables.

use crate::error::{RecordError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Path that opens a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];
const SYNCHRONOUS_MODES: &[&str] = &["OFF", "NORMAL", "FULL", "EXTRA"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub path: String,
    pub read_only: bool,
    pub journal_mode: String,
    pub synchronous: String,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            path: MEMORY_PATH.to_string(),
            read_only: false,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            foreign_keys: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl ConnectionConfig {
    pub fn new(path: impl Into<String>) -> Self {
        ConnectionConfig {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MEMORY_PATH)
    }

    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }

    /// Build a config from `RECORDS_DB_*` variables, falling back to defaults
    ///
    /// # Errors
    /// `RecordError::Validation` when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        let mut config = ConnectionConfig::default();
        if let Ok(path) = env::var("RECORDS_DB_PATH") {
            config.path = path;
        }
        if let Ok(value) = env::var("RECORDS_DB_READ_ONLY") {
            config.read_only = parse_flag("RECORDS_DB_READ_ONLY", &value)?;
        }
        if let Ok(value) = env::var("RECORDS_DB_JOURNAL_MODE") {
            config.journal_mode = value;
        }
        if let Ok(value) = env::var("RECORDS_DB_SYNCHRONOUS") {
            config.synchronous = value;
        }
        if let Ok(value) = env::var("RECORDS_DB_FOREIGN_KEYS") {
            config.foreign_keys = parse_flag("RECORDS_DB_FOREIGN_KEYS", &value)?;
        }
        if let Ok(value) = env::var("RECORDS_DB_BUSY_TIMEOUT_MS") {
            config.busy_timeout_ms = value.trim().parse().map_err(|_| {
                RecordError::validation(format!(
                    "RECORDS_DB_BUSY_TIMEOUT_MS must be a non-negative integer, got '{}'",
                    value
                ))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the path and PRAGMA values against what SQLite understands
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(RecordError::validation("database path must not be empty"));
        }
        if self.read_only && self.is_memory() {
            return Err(RecordError::validation(
                "read_only cannot be combined with an in-memory database",
            ));
        }
        check_mode("journal_mode", &self.journal_mode, JOURNAL_MODES)?;
        check_mode("synchronous", &self.synchronous, SYNCHRONOUS_MODES)?;
        Ok(())
    }
}

fn check_mode(name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.iter().any(|m| m.eq_ignore_ascii_case(value)) {
        Ok(())
    } else {
        Err(RecordError::validation(format!(
            "unsupported {} '{}', expected one of {}",
            name,
            value,
            allowed.join(", ")
        )))
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RecordError::validation(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert!(config.is_memory());
        assert_eq!(config.journal_mode, "WAL");
        assert!(config.foreign_keys);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"path": "app.db", "busy_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.path, "app.db");
        assert_eq!(config.busy_timeout_ms, 250);
        assert_eq!(config.synchronous, "NORMAL");
    }

    #[test]
    fn test_rejects_unknown_modes() {
        let mut config = ConnectionConfig::in_memory();
        config.journal_mode = "WAL; DROP TABLE users".to_string();
        assert!(config.validate().unwrap_err().is_validation());

        let mut config = ConnectionConfig::in_memory();
        config.synchronous = "full".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_read_only_memory_rejected() {
        let mut config = ConnectionConfig::in_memory();
        config.read_only = true;
        assert!(config.validate().unwrap_err().is_validation());

        config.path = "app.db".to_string();
        assert!(config.validate().is_ok());
    }

    const ENV_VARS: &[&str] = &[
        "RECORDS_DB_PATH",
        "RECORDS_DB_READ_ONLY",
        "RECORDS_DB_JOURNAL_MODE",
        "RECORDS_DB_SYNCHRONOUS",
        "RECORDS_DB_FOREIGN_KEYS",
        "RECORDS_DB_BUSY_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    // Only test in this binary that touches RECORDS_DB_*, so the cases run
    // sequentially in one function
    #[test]
    fn test_from_env() {
        clear_env();
        assert_eq!(ConnectionConfig::from_env().unwrap(), ConnectionConfig::default());

        env::set_var("RECORDS_DB_PATH", "/tmp/records-env-test.db");
        env::set_var("RECORDS_DB_READ_ONLY", "yes");
        env::set_var("RECORDS_DB_JOURNAL_MODE", "delete");
        env::set_var("RECORDS_DB_SYNCHRONOUS", "FULL");
        env::set_var("RECORDS_DB_FOREIGN_KEYS", "off");
        env::set_var("RECORDS_DB_BUSY_TIMEOUT_MS", " 250 ");
        let config = ConnectionConfig::from_env().unwrap();
        assert_eq!(
            config,
            ConnectionConfig {
                path: "/tmp/records-env-test.db".to_string(),
                read_only: true,
                journal_mode: "delete".to_string(),
                synchronous: "FULL".to_string(),
                foreign_keys: false,
                busy_timeout_ms: 250,
            }
        );

        let bad_values = [
            ("RECORDS_DB_BUSY_TIMEOUT_MS", "-1"),
            ("RECORDS_DB_BUSY_TIMEOUT_MS", "soon"),
            ("RECORDS_DB_READ_ONLY", "maybe"),
            ("RECORDS_DB_FOREIGN_KEYS", "2"),
            ("RECORDS_DB_JOURNAL_MODE", "SIDEWAYS"),
            ("RECORDS_DB_SYNCHRONOUS", "SOMETIMES"),
        ];
        for (var, value) in bad_values {
            clear_env();
            env::set_var(var, value);
            let err = ConnectionConfig::from_env().unwrap_err();
            assert!(err.is_validation(), "{var}={value}");
        }

        clear_env();
        env::set_var("RECORDS_DB_READ_ONLY", "1");
        assert!(ConnectionConfig::from_env().unwrap_err().is_validation());

        clear_env();
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "ON").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
