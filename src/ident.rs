//! SQL identifiers for table and column names
//!
//! Every name that ends up in generated SQL passes through [`Ident`], which only
//! accepts plain ASCII identifiers and always renders them double-quoted.

use crate::error::{RecordError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regex for plain identifiers: letter or underscore, then letters, digits, underscores
static IDENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

/// Longest identifier accepted
pub const MAX_IDENT_LEN: usize = 128;

/// Prefix SQLite reserves for its internal tables
const RESERVED_PREFIX: &str = "sqlite_";

/// A validated table or column name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ident(String);

impl Ident {
    /// Validate a name
    ///
    /// # Errors
    /// `RecordError::Validation` when the name is empty, too long, contains
    /// anything other than `[A-Za-z0-9_]`, starts with a digit, or uses the
    /// `sqlite_` prefix.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RecordError::validation("identifier must not be empty"));
        }
        if name.len() > MAX_IDENT_LEN {
            return Err(RecordError::validation(format!(
                "identifier '{}...' exceeds {} characters",
                name.chars().take(16).collect::<String>(),
                MAX_IDENT_LEN
            )));
        }
        if !IDENT_REGEX.is_match(&name) {
            return Err(RecordError::validation(format!(
                "invalid identifier '{}'",
                name
            )));
        }
        if name.to_ascii_lowercase().starts_with(RESERVED_PREFIX) {
            return Err(RecordError::validation(format!(
                "identifier '{}' uses the reserved sqlite_ prefix",
                name
            )));
        }
        Ok(Ident(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier in SQL form, e.g. `"users"`
    pub fn quoted(&self) -> String {
        // The regex rules out embedded quotes, so no escaping is needed
        format!("\"{}\"", self.0)
    }
}

/// Check whether a name would be accepted by [`Ident::new`]
pub fn is_valid_ident(name: &str) -> bool {
    Ident::new(name).is_ok()
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ident {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self> {
        Ident::new(value)
    }
}

impl TryFrom<&str> for Ident {
    type Error = RecordError;

    fn try_from(value: &str) -> Result<Self> {
        Ident::new(value)
    }
}

impl From<Ident> for String {
    fn from(value: Ident) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        for name in ["users", "user_id", "_private", "Table2", "a"] {
            assert!(is_valid_ident(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_rejects_injection_attempts() {
        for name in [
            "users; DROP TABLE users",
            "users--",
            "\"users\"",
            "user id",
            "1abc",
            "",
            "naïve",
        ] {
            let err = Ident::new(name).unwrap_err();
            assert!(err.is_validation(), "{name} should be a validation error");
        }
    }

    #[test]
    fn test_rejects_reserved_prefix() {
        assert!(!is_valid_ident("sqlite_master"));
        assert!(!is_valid_ident("SQLITE_sequence"));
        assert!(is_valid_ident("sqlitex"));
    }

    #[test]
    fn test_length_limit() {
        assert!(is_valid_ident(&"a".repeat(MAX_IDENT_LEN)));
        assert!(!is_valid_ident(&"a".repeat(MAX_IDENT_LEN + 1)));
    }

    #[test]
    fn test_quoted() {
        let ident = Ident::new("users").unwrap();
        assert_eq!(ident.quoted(), "\"users\"");
        assert_eq!(ident.to_string(), "users");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Ident = serde_json::from_str("\"email\"").unwrap();
        assert_eq!(ok.as_str(), "email");
        assert!(serde_json::from_str::<Ident>("\"bad name\"").is_err());
    }
}
