//! # Crosswalk Configuration
//!
//! Typed configuration for the crosswalk relay, loaded from TOML with
//! environment and command-line overrides.
//!
//! ```rust,no_run
//! use crosswalk_config::{ConfigLoader, ConfigOverrides};
//!
//! let config = ConfigLoader::load(None, ConfigOverrides::default())?;
//! println!("forwarding to {}", config.destination.base_url);
//! # Ok::<(), crosswalk_config::ConfigError>(())
//! ```

#![warn(clippy::all)]

pub mod components;
mod config;
mod loader;

pub use components::*;
pub use config::*;
pub use loader::*;
