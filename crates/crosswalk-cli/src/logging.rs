//! Subscriber setup
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` wins when set; otherwise the level comes from the CLI flag,
//! then from the config file.

use crosswalk_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::cli::LogLevel;

/// Crates whose events are shown at the configured level
const CRATES: &[&str] = &[
    "crosswalk",
    "crosswalk_cli",
    "crosswalk_core",
    "crosswalk_config",
    "crosswalk_sqlite",
    "crosswalk_pipeline",
];

/// Build the filter directive for our crates at `level`. A value that is
/// already a directive (`crosswalk_core=debug,warn`) is used as is.
pub fn filter_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolve the effective level: CLI flag, then config value.
pub fn effective_level(cli_level: Option<LogLevel>, config: &LoggingConfig) -> String {
    match cli_level {
        Some(level) => level.as_str().to_string(),
        None => config.level.trim().to_lowercase(),
    }
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(cli_level: Option<LogLevel>, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = effective_level(cli_level, config);
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .parse_lossy(filter_directive(&level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed (tests); keep the existing one
    let _ = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_covers_all_crates() {
        let directive = filter_directive("debug");
        assert!(directive.contains("crosswalk_core=debug"));
        assert!(directive.contains("crosswalk_pipeline=debug"));
        assert_eq!(directive.split(',').count(), CRATES.len());
    }

    #[test]
    fn test_explicit_directive_passes_through() {
        assert_eq!(
            filter_directive("crosswalk_sqlite=trace,warn"),
            "crosswalk_sqlite=trace,warn"
        );
    }

    #[test]
    fn test_cli_level_wins_over_config() {
        let config = LoggingConfig {
            level: "WARN".to_string(),
            ..Default::default()
        };
        assert_eq!(effective_level(None, &config), "warn");
        assert_eq!(effective_level(Some(LogLevel::Trace), &config), "trace");
    }
}
