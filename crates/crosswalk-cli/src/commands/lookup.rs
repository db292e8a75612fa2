use anyhow::Result;
use colored::Colorize;
use crosswalk_config::CrosswalkConfig;
use crosswalk_core::{CorrelationStore, SyncStatus};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::correlation_table;
use crate::context::open_store;

/// Report the synchronization state of one source record.
///
/// A record with no correlation is reported as not yet synchronized; that is
/// a normal state, not an error.
pub async fn execute(
    config: CrosswalkConfig,
    entity: String,
    source_id: String,
    format: OutputFormat,
) -> Result<()> {
    let store = open_store(&config)?;
    let correlations = store.find_by_source_id(&entity, &source_id).await?;
    let status = SyncStatus::from_correlations(&correlations);

    match format {
        OutputFormat::Json => {
            let report = json!({
                "entity": entity,
                "source_id": source_id,
                "status": status,
                "correlations": correlations,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let label = match status {
                SyncStatus::Complete => status.as_str().green().bold(),
                SyncStatus::Pending => status.as_str().yellow().bold(),
                SyncStatus::NotSynchronized => status.as_str().dimmed(),
            };
            println!("{} {}: {}", entity, source_id, label);

            if !correlations.is_empty() {
                println!("{}", correlation_table(&correlations));
            }
        }
    }

    Ok(())
}
