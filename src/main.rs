//! Evict: temporarily exclude disabled and deleted users from all access.
//!
//! This is the main entry point for the `evict` CLI. It parses arguments,
//! initializes logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

mod cli;
mod commands;
pub mod audit;
pub mod clock;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod exclusions;
pub mod exit_codes;
pub mod fs;
pub mod handlers;
pub mod locks;
pub mod policy;
pub mod retry;
pub mod table;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Diagnostics go to stderr so stdout stays parseable (`list --json`)
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match commands::dispatch(cli.home.as_deref(), cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");

            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
