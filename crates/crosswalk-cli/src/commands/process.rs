use anyhow::{Context, Result};
use colored::Colorize;
use crosswalk_config::CrosswalkConfig;
use crosswalk_pipeline::{CorrelationOutcome, ProcessingOutcome};
use std::path::PathBuf;

use crate::commands::read_envelope;
use crate::context::build_pipeline;

/// Run one envelope through decode, route, dispatch and correlation.
pub async fn execute(config: CrosswalkConfig, file: PathBuf) -> Result<()> {
    let raw = read_envelope(&file)?;
    let pipeline = build_pipeline(&config)?;

    let outcome = pipeline
        .process(&raw)
        .await
        .context("Event processing failed")?;

    match outcome {
        ProcessingOutcome::Skipped { decision } => {
            let reason = decision
                .skip_reason()
                .map(ToString::to_string)
                .unwrap_or_default();
            println!(
                "{} {} {} from {}: {}",
                "Skipped:".yellow().bold(),
                decision.entity,
                decision.operation,
                decision.source,
                reason
            );
        }
        ProcessingOutcome::Forwarded {
            decision,
            response,
            correlation,
        } => {
            println!(
                "{} {} {} -> {} {} (status {})",
                "Forwarded:".green().bold(),
                decision.entity,
                decision.operation,
                decision.verb,
                decision.address,
                response.status
            );

            match correlation {
                CorrelationOutcome::Recorded {
                    canonical_id,
                    source_id,
                    destination_id,
                } => println!(
                    "{} {} (source {} -> destination {})",
                    "Correlated:".green().bold(),
                    canonical_id,
                    source_id,
                    destination_id
                ),
                CorrelationOutcome::Abandoned(reason) => {
                    println!("{} {}", "Not correlated:".yellow().bold(), reason)
                }
            }
        }
    }

    Ok(())
}
