//! Configuration loading
//!
//! Precedence, lowest to highest: defaults, config file, environment,
//! explicit overrides (command-line flags).

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ConfigError, ConfigResult, CrosswalkConfig};

/// Skip the user config file entirely (used by tests)
pub const TEST_MODE_ENV: &str = "CROSSWALK_TEST_MODE";
pub const DESTINATION_URL_ENV: &str = "CROSSWALK_DESTINATION_URL";
pub const DATABASE_PATH_ENV: &str = "CROSSWALK_DATABASE_PATH";
pub const CHANNEL_ENV: &str = "CROSSWALK_CHANNEL";
pub const LOG_LEVEL_ENV: &str = "CROSSWALK_LOG_LEVEL";
pub const AUTHORITATIVE_SOURCE_ENV: &str = "CROSSWALK_AUTHORITATIVE_SOURCE";

/// Values supplied on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub destination_url: Option<String>,
    pub database_path: Option<PathBuf>,
    pub channel: Option<String>,
    pub log_level: Option<String>,
}

/// Loads [`CrosswalkConfig`] from file, environment and overrides.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load with full precedence and validate the result.
    ///
    /// A missing config file is not an error; defaults are used.
    pub fn load(
        config_file: Option<PathBuf>,
        overrides: ConfigOverrides,
    ) -> ConfigResult<CrosswalkConfig> {
        let mut config = Self::from_file_or_default(config_file)?;
        Self::apply_env(&mut config);
        Self::apply_overrides(&mut config, overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<CrosswalkConfig> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// `<config dir>/crosswalk/config.toml`
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("crosswalk");
        Ok(config_dir.join("config.toml"))
    }

    /// Write an annotated example config file.
    pub fn create_example(path: &Path, force: bool) -> ConfigResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, EXAMPLE_CONFIG).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_file_or_default(config_file: Option<PathBuf>) -> ConfigResult<CrosswalkConfig> {
        if std::env::var(TEST_MODE_ENV).is_ok() && config_file.is_none() {
            return Ok(CrosswalkConfig::default());
        }

        let path = config_file
            .or_else(|| Self::default_config_path().ok())
            .filter(|p| p.exists());

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_file(&path)
            }
            None => Ok(CrosswalkConfig::default()),
        }
    }

    fn apply_env(config: &mut CrosswalkConfig) {
        if let Some(url) = env_value(DESTINATION_URL_ENV) {
            config.destination.base_url = url;
        }
        if let Some(path) = env_value(DATABASE_PATH_ENV) {
            config.storage.database_path = PathBuf::from(path);
        }
        if let Some(channel) = env_value(CHANNEL_ENV) {
            config.channel.name = channel;
        }
        if let Some(level) = env_value(LOG_LEVEL_ENV) {
            config.logging.level = level;
        }
        if let Some(source) = env_value(AUTHORITATIVE_SOURCE_ENV) {
            config.routing.authoritative_source = source;
        }
    }

    fn apply_overrides(config: &mut CrosswalkConfig, overrides: ConfigOverrides) {
        if let Some(url) = overrides.destination_url {
            config.destination.base_url = url;
        }
        if let Some(path) = overrides.database_path {
            config.storage.database_path = path;
        }
        if let Some(channel) = overrides.channel {
            config.channel.name = channel;
        }
        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }
    }
}

/// Set, non-blank environment variable
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

const EXAMPLE_CONFIG: &str = r#"# Crosswalk relay configuration
# Location: ~/.config/crosswalk/config.toml

[channel]
# Pub/sub channel carrying change events
name = "crud-channel"

# Events processed concurrently
max_in_flight = 8

[destination]
# Base URL of the destination system (CROSSWALK_DESTINATION_URL)
base_url = "http://localhost:8080"

# Per-request timeout in seconds
timeout_secs = 30

[routing]
# System of record for entity creation: ACADEMIC or LIBRARY
authoritative_source = "ACADEMIC"

# Resource path overrides
# [[routing.entities]]
# name = "Student"
# path = "/users"

[storage]
# SQLite database holding canonical entities and correlations
database_path = "./crosswalk.db"

# Milliseconds a writer waits on a locked database
busy_timeout_ms = 5000

[logging]
# trace, debug, info, warn, error, or an EnvFilter directive
level = "info"

# text or json
format = "text"
"#;
