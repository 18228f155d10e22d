//! Guided CLI - command-line interface for guided exercises
//!
//! This CLI gives content authors and developers a terminal interface to:
//! - Validate exercise definitions before shipping them
//! - Check a slot-value tuple against an equation's canonical answer
//! - Replay a scripted learner session and see every transition
//! - Inspect saved progress snapshots

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::{check, inspect, replay, validate};
use error::CliResult;

/// Guided CLI application
#[derive(Parser)]
#[command(name = "guided")]
#[command(about = "Guided exercise engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long, global = true, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Validate one or more exercise definitions
    Validate(validate::ValidateArgs),

    /// Evaluate slot values against one equation's answer
    Check(check::CheckArgs),

    /// Run a scripted session against a definition
    Replay(replay::ReplayArgs),

    /// Show a progress snapshot or a progress store directory
    Inspect(inspect::InspectArgs),
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Logs go to stderr so structured output stays parseable
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Validate(args) => validate::execute(args, cli.output),
        Commands::Check(args) => check::execute(args, cli.output),
        Commands::Replay(args) => replay::execute(args, cli.output).await,
        Commands::Inspect(args) => inspect::execute(args, cli.output).await,
    }
}
