use anyhow::{Context, Result};
use colored::Colorize;
use crosswalk_config::{ConfigError, ConfigLoader, CrosswalkConfig};
use std::path::PathBuf;

use crate::cli::ConfigFormat;

/// Write an example config file.
///
/// An existing file is left alone unless `force` is set.
pub fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => ConfigLoader::default_config_path().context("Could not determine config file path")?,
    };

    match ConfigLoader::create_example(&config_path, force) {
        Ok(()) => {
            println!(
                "{} Created config file at: {}",
                "Success:".green().bold(),
                config_path.display()
            );
            println!(
                "\n{}",
                "Edit this file to point the relay at your destination system.".dimmed()
            );
            Ok(())
        }
        Err(ConfigError::AlreadyExists(existing)) => {
            println!(
                "{} Config file already exists at: {}",
                "Error:".red().bold(),
                existing.display()
            );
            println!("Use {} to overwrite", "--force".yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the effective configuration (all precedence applied).
pub fn show(config: &CrosswalkConfig, format: ConfigFormat) -> Result<()> {
    let rendered = match format {
        ConfigFormat::Json => config.to_json()?,
        ConfigFormat::Toml => config.to_toml()?,
    };
    println!("{}", rendered);
    Ok(())
}
