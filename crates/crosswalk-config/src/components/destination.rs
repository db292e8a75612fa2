//! Destination system configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where translated payloads are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Base URL; resource paths are appended to it
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl DestinationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
