//! Top-level configuration and validation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::components::{
    ChannelConfig, DestinationConfig, LoggingConfig, RoutingConfig, StorageConfig,
};

/// Names accepted for `routing.authoritative_source`
pub const SOURCE_SYSTEM_NAMES: &[&str] = &[
    "ACADEMIC", "ORM", "SYSTEM_A", "LIBRARY", "ODM", "SYSTEM_B",
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete relay configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosswalkConfig {
    pub channel: ChannelConfig,
    pub destination: DestinationConfig,
    pub routing: RoutingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl CrosswalkConfig {
    /// Check values that would make the relay misbehave at runtime.
    pub fn validate(&self) -> ConfigResult<()> {
        let base_url = self.destination.base_url.trim();
        if base_url.is_empty() {
            return Err(invalid("destination.base_url", "must not be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid(
                "destination.base_url",
                format!("expected an http(s) URL, got '{}'", base_url),
            ));
        }
        if self.destination.timeout_secs == 0 {
            return Err(invalid("destination.timeout_secs", "must be greater than zero"));
        }

        if self.channel.name.trim().is_empty() {
            return Err(invalid("channel.name", "must not be empty"));
        }
        if self.channel.max_in_flight == 0 {
            return Err(invalid("channel.max_in_flight", "must be greater than zero"));
        }

        let source = self.routing.authoritative_source.trim().to_ascii_uppercase();
        if !SOURCE_SYSTEM_NAMES.contains(&source.as_str()) {
            return Err(invalid(
                "routing.authoritative_source",
                format!(
                    "'{}' is not one of {}",
                    self.routing.authoritative_source,
                    SOURCE_SYSTEM_NAMES.join(", ")
                ),
            ));
        }

        for route in &self.routing.entities {
            if route.name.trim().is_empty() {
                return Err(invalid("routing.entities.name", "must not be empty"));
            }
            if route.path.trim().is_empty() {
                return Err(invalid(
                    "routing.entities.path",
                    format!("empty path for entity '{}'", route.name),
                ));
            }
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(invalid("storage.database_path", "must not be empty"));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Render as JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

fn invalid(key: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: message.into(),
    }
}
