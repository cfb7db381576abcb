//! Staffdesk CLI
//!
//! Command-line front end for the staffing Q&A engine. Answers
//! natural-language questions about workload, timetables, availability,
//! and institute policies from local data files.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, HealthCommand, ReindexCommand};
use staffdesk_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Staffdesk - staffing questions answered from local tables and policies
#[derive(Parser, Debug)]
#[command(name = "staffdesk")]
#[command(about = "Answer staffing questions from workload, timetable, and policy data", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "STAFFDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Generation provider (ollama, none)
    #[arg(short, long, global = true, env = "STAFFDESK_GEN_PROVIDER")]
    provider: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about staffing data
    Ask(AskCommand),

    /// Rebuild the semantic policy index
    Reindex(ReindexCommand),

    /// Show engine status
    Health(HealthCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(&config)?;

    tracing::debug!("Workload table: {:?}", config.workload_file);
    tracing::debug!("Policies: {:?}", config.policies_file);
    tracing::debug!("Generation provider: {}", config.generation.provider);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Reindex(_) => "reindex",
        Commands::Health(_) => "health",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Reindex(cmd) => cmd.execute(&config).await,
        Commands::Health(cmd) => cmd.execute(&config).await,
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {}", e);
    }
    Ok(result?)
}
