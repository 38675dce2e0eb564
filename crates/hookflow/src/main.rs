//! hookflow - command-line console for the hookflow automation API.
//!
//! Main entry point for the hookflow CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{actions, config, events, executions, sequences, workflows};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// hookflow - manage webhook events, sequences and workflows
#[derive(Parser)]
#[command(name = "hookflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API root (default: current context, then http://localhost:8000/api/)
    #[arg(long, global = true, env = "HOOKFLOW_SERVER_URL")]
    pub server: Option<String>,

    /// Context from client.yaml to use instead of the current one
    #[arg(long, global = true)]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inbound webhook events and their test endpoints
    Events(events::EventsArgs),

    /// Sequences, test runs and executions
    Sequences(sequences::SequencesArgs),

    /// Async executions and their stats
    Executions(executions::ExecutionsArgs),

    /// Connector actions
    Actions(actions::ActionsArgs),

    /// Workflows and workflow rules
    Workflows(workflows::WorkflowsArgs),

    /// Configuration and context management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "hookflow=debug,hookflow_client=debug,hookflow_console=debug,hookflow_config=debug,warn"
    } else {
        "hookflow=info,hookflow_console=warn,warn"
    };

    let log_dir = hookflow_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "hookflow.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "hookflow=trace,hookflow_client=trace,hookflow_console=trace,hookflow_config=trace,info",
                )),
        )
        .init();

    // Config commands manage client.yaml themselves, so the context is only
    // resolved for commands that talk to the server.
    let resolve = || {
        commands::Context::resolve(
            cli.server.clone(),
            cli.context.as_deref(),
            cli.json,
            cli.verbose,
        )
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Events(args) => events::run(args, &resolve()?).await,
        Commands::Sequences(args) => sequences::run(args, &resolve()?).await,
        Commands::Executions(args) => executions::run(args, &resolve()?).await,
        Commands::Actions(args) => actions::run(args, &resolve()?).await,
        Commands::Workflows(args) => workflows::run(args, &resolve()?).await,
        Commands::Config(args) => config::run(args, cli.json).await,
    }
}
