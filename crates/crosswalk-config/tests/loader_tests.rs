//! Config loading precedence: defaults < file < environment < overrides

use crosswalk_config::*;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

const ALL_ENV: &[&str] = &[
    DESTINATION_URL_ENV,
    DATABASE_PATH_ENV,
    CHANNEL_ENV,
    LOG_LEVEL_ENV,
    AUTHORITATIVE_SOURCE_ENV,
];

/// Clears relay env vars on creation and on drop
struct EnvGuard;

impl EnvGuard {
    fn new() -> Self {
        for key in ALL_ENV {
            std::env::remove_var(key);
        }
        std::env::set_var(TEST_MODE_ENV, "1");
        Self
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in ALL_ENV {
            std::env::remove_var(key);
        }
        std::env::remove_var(TEST_MODE_ENV);
    }
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
#[serial]
fn test_defaults_in_test_mode() {
    let _guard = EnvGuard::new();
    let config = ConfigLoader::load(None, ConfigOverrides::default()).unwrap();
    assert_eq!(config, CrosswalkConfig::default());
}

#[test]
#[serial]
fn test_partial_file_keeps_defaults() {
    let _guard = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[destination]
base_url = "https://library.example/api"

[[routing.entities]]
name = "Book"
path = "/catalog"
"#,
    );

    let config = ConfigLoader::load(Some(path), ConfigOverrides::default()).unwrap();
    assert_eq!(config.destination.base_url, "https://library.example/api");
    assert_eq!(config.destination.timeout_secs, 30);
    assert_eq!(config.channel.name, "crud-channel");
    assert_eq!(config.routing.entities.len(), 1);
    assert_eq!(config.routing.entities[0].path, "/catalog");
}

#[test]
#[serial]
fn test_env_beats_file_and_overrides_beat_env() {
    let _guard = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[destination]
base_url = "http://from-file:8080"

[logging]
level = "warn"
"#,
    );

    std::env::set_var(DESTINATION_URL_ENV, "http://from-env:8080");
    std::env::set_var(LOG_LEVEL_ENV, "debug");
    std::env::set_var(AUTHORITATIVE_SOURCE_ENV, "LIBRARY");

    let config = ConfigLoader::load(
        Some(path),
        ConfigOverrides {
            destination_url: Some("http://from-args:8080".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.destination.base_url, "http://from-args:8080");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.routing.authoritative_source, "LIBRARY");
}

#[test]
#[serial]
fn test_blank_env_is_ignored() {
    let _guard = EnvGuard::new();
    std::env::set_var(CHANNEL_ENV, "   ");
    let config = ConfigLoader::load(None, ConfigOverrides::default()).unwrap();
    assert_eq!(config.channel.name, "crud-channel");
}

#[test]
#[serial]
fn test_invalid_file_is_reported() {
    let _guard = EnvGuard::new();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[channel]\nmax_in_flight = \"many\"\n");

    let err = ConfigLoader::load(Some(path), ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
#[serial]
fn test_loaded_config_is_validated() {
    let _guard = EnvGuard::new();
    std::env::set_var(AUTHORITATIVE_SOURCE_ENV, "CRM");
    let err = ConfigLoader::load(None, ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn test_create_example_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    ConfigLoader::create_example(&path, false).unwrap();
    let config = ConfigLoader::from_file(&path).unwrap();
    assert_eq!(config, CrosswalkConfig::default());

    assert!(matches!(
        ConfigLoader::create_example(&path, false),
        Err(ConfigError::AlreadyExists(_))
    ));
    ConfigLoader::create_example(&path, true).unwrap();
}
