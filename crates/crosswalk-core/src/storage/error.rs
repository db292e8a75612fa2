//! Storage error types

use thiserror::Error;

use crate::canonical::CanonicalId;

/// Error type for correlation storage operations
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Canonical entity already exists: {0}")]
    DuplicateCanonicalId(CanonicalId),

    #[error("Correlation references unknown canonical entity: {0}")]
    MissingCanonical(CanonicalId),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Concurrent access error: {0}")]
    ConcurrentAccess(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }
}
