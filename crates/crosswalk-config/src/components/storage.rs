//! Correlation storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SQLite database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    /// How long a writer waits on a locked database
    pub busy_timeout_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./crosswalk.db"),
            busy_timeout_ms: 5000,
        }
    }
}
