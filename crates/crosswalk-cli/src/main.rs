use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crosswalk_cli::{
    cli::{Cli, Commands, ConfigCommands},
    commands, logging,
};
use crosswalk_config::{ConfigLoader, ConfigOverrides, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_level = cli.log_level();

    // Writing an example config must work even when the current one is broken
    let command = match cli.command {
        Commands::Config(ConfigCommands::Init { path, force }) => {
            logging::init(cli_level, &LoggingConfig::default());
            return commands::config::init(path, force);
        }
        command => command,
    };

    let overrides = ConfigOverrides {
        destination_url: cli.destination_url,
        database_path: cli.db_path,
        channel: None,
        log_level: cli_level.map(|level| level.as_str().to_string()),
    };
    let config = ConfigLoader::load(cli.config, overrides)?;

    logging::init(cli_level, &config.logging);
    debug!(
        destination = %config.destination.base_url,
        database = %config.storage.database_path.display(),
        "Configuration loaded"
    );

    match command {
        Commands::Listen {
            input,
            max_in_flight,
            json,
        } => commands::listen::execute(config, input, max_in_flight, json).await?,

        Commands::Process { file } => commands::process::execute(config, file).await?,

        Commands::Route { file } => commands::route::execute(config, file)?,

        Commands::Lookup {
            entity,
            source_id,
            format,
        } => commands::lookup::execute(config, entity, source_id, format).await?,

        Commands::List { limit, format } => commands::list::execute(config, limit, format).await?,

        Commands::Config(ConfigCommands::Show { format }) => {
            commands::config::show(&config, format)?
        }

        // Handled before configuration is loaded
        Commands::Config(ConfigCommands::Init { .. }) => {}
    }

    Ok(())
}
