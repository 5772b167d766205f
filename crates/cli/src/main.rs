//! Versekit CLI
//!
//! Main entry point for the versekit command-line tool: parse a verse
//! source, chunk it, and import the chunks into a document store.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AnalyzeCommand, ImportCommand, SearchCommand, StatusCommand, ValidateCommand};
use std::path::PathBuf;
use versekit_core::{
    config::AppConfig,
    logging::{self, LogFormat},
};

/// Versekit - token-budgeted verse chunking for semantic search
#[derive(Parser, Debug)]
#[command(name = "versekit")]
#[command(about = "Chunk verse corpora and import them into a document store", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "VERSEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Document store base URL
    #[arg(long, global = true)]
    store_url: Option<String>,

    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse, chunk and import a translation
    Import(ImportCommand),

    /// Check a verses CSV for data problems
    Validate(ValidateCommand),

    /// Report chunking quality without importing
    Analyze(AnalyzeCommand),

    /// Show document store health and counts
    Status(StatusCommand),

    /// Run a semantic search against the store
    Search(SearchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let config = config.with_overrides(cli.store_url, cli.log_level, cli.verbose, cli.no_color);

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("Versekit CLI starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Store: {}", config.store_url);

    let command_name = match &cli.command {
        Commands::Import(_) => "import",
        Commands::Validate(_) => "validate",
        Commands::Analyze(_) => "analyze",
        Commands::Status(_) => "status",
        Commands::Search(_) => "search",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Import(cmd) => cmd.execute(config).await,
        Commands::Validate(cmd) => cmd.execute(config),
        Commands::Analyze(cmd) => cmd.execute(config),
        Commands::Status(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
