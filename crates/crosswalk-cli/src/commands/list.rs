use anyhow::Result;
use colored::Colorize;
use crosswalk_config::CrosswalkConfig;
use crosswalk_core::CorrelationStore;

use crate::cli::OutputFormat;
use crate::commands::correlation_table;
use crate::context::open_store;

pub async fn execute(config: CrosswalkConfig, limit: usize, format: OutputFormat) -> Result<()> {
    let store = open_store(&config)?;
    let correlations = store.list_correlations(limit).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&correlations)?);
        }
        OutputFormat::Table => {
            if correlations.is_empty() {
                println!("{}", "No correlations recorded.".dimmed());
                return Ok(());
            }

            let total = store.count_correlations().await?;
            println!("{}", correlation_table(&correlations));
            println!("Showing {} of {} correlations", correlations.len(), total);
        }
    }

    Ok(())
}
