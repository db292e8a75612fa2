//! Subcommand implementations

pub mod config;
pub mod list;
pub mod listen;
pub mod lookup;
pub mod process;
pub mod route;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use crosswalk_core::IdentityCorrelation;
use std::path::Path;

/// Read a single envelope from a file.
pub(crate) fn read_envelope(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read envelope from {}", path.display()))?;
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("Envelope file {} is empty", path.display());
    }
    Ok(raw.to_string())
}

/// Table of correlations, one row each.
pub(crate) fn correlation_table(correlations: &[IdentityCorrelation]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Canonical ID",
        "Entity",
        "Source",
        "Source ID",
        "Destination ID",
        "State",
        "Last Updated",
    ]);

    for correlation in correlations {
        let state = if correlation.is_complete() {
            Cell::new("complete").fg(Color::Green)
        } else {
            Cell::new("pending").fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(correlation.canonical_id),
            Cell::new(&correlation.entity_type),
            Cell::new(correlation.source_system),
            Cell::new(&correlation.source_id),
            Cell::new(correlation.destination_id.as_deref().unwrap_or("-")),
            state,
            Cell::new(correlation.last_updated.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }

    table
}
