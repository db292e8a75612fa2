//! SQLite connection settings

use std::path::{Path, PathBuf};

/// Path reserved for an in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub path: PathBuf,
    pub wal_mode: bool,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
    /// Negative values are KiB, positive values are pages
    pub cache_size: i32,
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size: -8000,
        }
    }

    /// In-memory database, gone when the pool is dropped
    pub fn memory() -> Self {
        Self {
            wal_mode: false,
            ..Self::new(MEMORY_PATH)
        }
    }

    /// Set the busy timeout (builder pattern).
    pub fn with_busy_timeout(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }
}
