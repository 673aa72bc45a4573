//! harborscan CLI entry point
//!
//! Parses arguments, initializes logging from the `[general]` config
//! section, dispatches to the subcommand handlers, and maps errors to
//! process exit codes.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use harborscan_core::config::HarborscanConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.output);

    // Logging must come up even when the config file is broken, so this
    // load is best effort. `config validate` reports the real problem.
    let general = HarborscanConfig::load(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_default();

    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(cli, &writer).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, writer).await,
        Commands::Formats(args) => commands::formats::execute(args, &cli.config, writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, writer).await,
    }
}
