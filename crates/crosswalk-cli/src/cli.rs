use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages, including payloads
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output format for query commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON for programmatic consumption
    Json,
}

/// Output format for `config show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

#[derive(Parser)]
#[command(name = "crosswalk")]
#[command(about = "crosswalk - relay change events between systems and track identity correlations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses the config file value or defaults to 'info'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/crosswalk/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Correlation database path (overrides config file)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Destination system base URL (overrides config file)
    #[arg(long, global = true)]
    pub destination_url: Option<String>,
}

impl Cli {
    /// Effective CLI log level; `--log-level` wins over `--verbose`.
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
            .or(if self.verbose { Some(LogLevel::Debug) } else { None })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Relay newline-delimited envelopes until end of input or Ctrl-C
    Listen {
        /// Read envelopes from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Maximum events processed concurrently (overrides config file)
        #[arg(long)]
        max_in_flight: Option<usize>,

        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one envelope through the full pipeline
    Process {
        /// File containing a single JSON envelope
        file: PathBuf,
    },

    /// Show the routing decision for an envelope without dispatching it
    Route {
        /// File containing a single JSON envelope
        file: PathBuf,
    },

    /// Show the synchronization state of a source record
    Lookup {
        /// Entity type, e.g. Student
        #[arg(short, long)]
        entity: String,

        /// Identifier assigned by the source system
        #[arg(short, long)]
        source_id: String,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List recorded correlations, most recent first
    List {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write an example config file
    Init {
        /// Where to write (defaults to ~/.config/crosswalk/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        #[arg(short = 'f', long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}
