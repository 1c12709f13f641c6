//! # comreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use comreg_cli::remind::{run_remind, RemindArgs};
use comreg_cli::status::{run_status, StatusArgs};

/// COMREG Compliance Registry CLI
///
/// Operational jobs for the registry: scheduled expiry-reminder dispatch
/// (with license status refresh) and date classification checks.
#[derive(Parser, Debug)]
#[command(name = "comreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Refresh license statuses and send expiry reminders.
    Remind(RemindArgs),

    /// Classify an expiration date against today.
    Status(StatusArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Remind(args) => run_remind(&args).await,
        Commands::Status(args) => run_status(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
