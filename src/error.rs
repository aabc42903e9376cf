use thiserror::Error;

/// Errors surfaced by the record store
#[derive(Error, Debug)]
pub enum RecordError {
    /// The database rejected or failed to execute a statement
    #[error("SQLite Error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Caller-supplied data was rejected before any statement ran
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("DB Lock failed")]
    LockPoisoned,
}

impl RecordError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        RecordError::Validation(msg.into())
    }

    pub fn is_query(&self) -> bool {
        matches!(self, RecordError::Query(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RecordError::Validation(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RecordError>;

#[cfg(feature = "node")]
pub fn to_napi_error(err: RecordError) -> napi::Error {
    let status = match err {
        RecordError::Validation(_) => napi::Status::InvalidArg,
        _ => napi::Status::GenericFailure,
    };
    napi::Error::new(status, err.to_string())
}
