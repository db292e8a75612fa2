//! Inbound channel configuration

use serde::{Deserialize, Serialize};

/// Pub/sub channel and relay concurrency settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel the relay subscribes to
    pub name: String,
    /// Events processed concurrently
    pub max_in_flight: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: "crud-channel".to_string(),
            max_in_flight: 8,
        }
    }
}
