use anyhow::{Context, Result};
use crosswalk_config::CrosswalkConfig;
use crosswalk_core::ChangeEvent;
use std::path::PathBuf;

use crate::commands::read_envelope;
use crate::context::build_router;

/// Dry run: decode, route and translate without dispatching.
pub fn execute(config: CrosswalkConfig, file: PathBuf) -> Result<()> {
    let raw = read_envelope(&file)?;
    let event = ChangeEvent::decode(&raw).context("Failed to decode envelope")?;

    let router = build_router(&config)?;
    let decision = router.route(&event);

    println!("{}", serde_json::to_string_pretty(&decision.to_json())?);
    Ok(())
}
