//! Crosswalk CLI library
//!
//! Backs the `crosswalk` binary: argument parsing, logging setup, wiring from
//! configuration to the pipeline, and the subcommands.

pub mod cli;
pub mod commands;
pub mod context;
pub mod logging;
