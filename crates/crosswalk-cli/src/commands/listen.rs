use anyhow::{Context, Result};
use colored::Colorize;
use crosswalk_config::CrosswalkConfig;
use crosswalk_core::LineSource;
use crosswalk_pipeline::{Relay, RelaySummary};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::warn;

use crate::context::build_pipeline;

/// Relay envelopes from a file or stdin until end of input or Ctrl-C.
pub async fn execute(
    config: CrosswalkConfig,
    input: Option<PathBuf>,
    max_in_flight: Option<usize>,
    json: bool,
) -> Result<()> {
    let pipeline = build_pipeline(&config)?;
    let relay = Relay::new(pipeline)
        .with_max_in_flight(max_in_flight.unwrap_or(config.channel.max_in_flight));
    let channel = config.channel.name.clone();

    let summary = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let source = LineSource::new(BufReader::new(file), channel)
                .with_label(path.display().to_string());
            relay.run(source, shutdown_signal()).await?
        }
        None => {
            let source =
                LineSource::new(BufReader::new(tokio::io::stdin()), channel).with_label("stdin");
            relay.run(source, shutdown_signal()).await?
        }
    };

    print_summary(&summary, json)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

fn print_summary(summary: &RelaySummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{}", "Relay finished".bold());
    println!("  Received:               {}", summary.received);
    println!("  Forwarded:              {}", summary.forwarded.to_string().green());
    println!("  Skipped:                {}", summary.skipped);
    println!("  Failed:                 {}", summary.failed.to_string().red());
    println!("  Correlations recorded:  {}", summary.correlations_recorded);
    println!("  Correlations abandoned: {}", summary.correlation_failures);
    Ok(())
}
