//! Error types for SQLite storage

use crosswalk_core::{CanonicalId, StorageError};
use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Canonical id already present
    #[error("Duplicate canonical id: {0}")]
    Duplicate(CanonicalId),

    /// Stored row could not be decoded
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::Backend(msg),
            SqliteError::Schema(msg) => Self::Backend(msg),
            SqliteError::Duplicate(id) => Self::DuplicateCanonicalId(id),
            SqliteError::CorruptRow(msg) => Self::Deserialization(msg),
            SqliteError::Serialization(msg) => Self::Serialization(msg),
            SqliteError::Rusqlite(rusqlite::Error::SqliteFailure(e, msg))
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                Self::ConcurrentAccess(msg.unwrap_or_else(|| e.to_string()))
            }
            SqliteError::Rusqlite(e) => Self::Backend(e.to_string()),
        }
    }
}
