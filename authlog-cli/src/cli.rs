//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// authlog -- classify authentication log lines into structured records.
///
/// Use `authlog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "authlog", version, about, long_about = None)]
pub struct Cli {
    /// Path to an authlog.toml configuration file (defaults + env overrides when omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(
        long,
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a log file and print a window of records as a table.
    Inspect(InspectArgs),

    /// Classify a log file and write every record as CSV or JSON.
    Export(ExportArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- inspect ----

/// Classify a `.log` file and display the selected records.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the authentication log file.
    pub file: PathBuf,

    /// Number of records to show (default: `[output] limit`).
    #[arg(short = 'n', long, conflicts_with = "all")]
    pub limit: Option<usize>,

    /// Show every record.
    #[arg(short, long)]
    pub all: bool,

    /// Select the last N records instead of the first N.
    #[arg(short, long)]
    pub tail: bool,

    /// Display the selected records in reverse order.
    #[arg(short, long)]
    pub reverse: bool,

    /// Skip malformed lines instead of aborting.
    #[arg(long)]
    pub skip_malformed: bool,
}

// ---- export ----

/// Export every classified record of a `.log` file.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the authentication log file.
    pub file: PathBuf,

    /// Export format.
    #[arg(short, long)]
    pub format: ExportFormat,

    /// Output file (default: stdout).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Skip malformed lines instead of aborting.
    #[arg(long)]
    pub skip_malformed: bool,
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array of records.
    Json,
}

// ---- config ----

/// Manage authlog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration (and the classification tables it points to).
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, classifier, source, output).
        #[arg(long)]
        section: Option<String>,
    },
}
