//! authlog CLI entry point
//!
//! Parses arguments, loads configuration, initializes logging, then
//! dispatches to the subcommand handler. Errors are printed to stderr
//! and mapped to an exit code via [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    // `config validate` reports load failures itself instead of failing early
    let mut config = match &cli.command {
        Commands::Config(_) => commands::load_config(config_path)
            .await
            .unwrap_or_default(),
        _ => commands::load_config(config_path).await?,
    };

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }

    let color = config.output.color && !cli.no_color;
    if !color {
        colored::control::set_override(false);
    }

    logging::init_tracing(&config.general, color)
        .map_err(|e| CliError::Config(e.to_string()))?;
    authlog_core::metrics::describe_metrics();

    tracing::debug!(command = ?cli.command, "authlog starting");

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args, &config, &writer).await,
        Commands::Export(args) => commands::export::execute(args, &config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
    }
}
