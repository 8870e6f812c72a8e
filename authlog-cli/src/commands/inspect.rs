//! `authlog inspect` command handler

use std::io::Write;
use std::path::Path;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use authlog_classifier::MalformedLine;
use authlog_core::config::AuthlogConfig;
use authlog_core::types::{LogRecord, ParsedBatch, Status};

use crate::cli::InspectArgs;
use crate::commands::classify_file;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Width of the table separator line.
const TABLE_WIDTH: usize = 150;

/// Execute the `inspect` command.
pub async fn execute(
    args: InspectArgs,
    config: &AuthlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = classify_file(&args.file, config, args.skip_malformed).await?;

    let limit = if args.all {
        None
    } else {
        Some(args.limit.unwrap_or(config.output.limit))
    };
    let window = RecordWindow {
        limit,
        tail: args.tail,
        reverse: args.reverse,
    };

    let inspect = InspectReport::build(
        &args.file,
        &report.batch,
        &window,
        report.total_lines,
        report.skipped,
    );
    writer.render(&inspect)?;

    Ok(())
}

/// Which records of a batch to display and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordWindow {
    /// Maximum number of records (`None` = all).
    pub limit: Option<usize>,
    /// Take the last records instead of the first.
    pub tail: bool,
    /// Reverse the display order of the selected records.
    pub reverse: bool,
}

impl RecordWindow {
    /// Indices into a batch of `total` records, in display order.
    pub fn indices(&self, total: usize) -> Vec<usize> {
        let count = self.limit.map_or(total, |n| n.min(total));
        let range = if self.tail {
            (total - count)..total
        } else {
            0..count
        };

        if self.reverse {
            range.rev().collect()
        } else {
            range.collect()
        }
    }
}

/// One displayed row: the 1-based record number plus the record itself.
#[derive(Debug, Serialize)]
pub struct InspectRow {
    pub nr: usize,
    #[serde(flatten)]
    pub record: LogRecord,
}

/// Inspect report: the selected records and what was left out.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub source: String,
    pub total_lines: usize,
    pub total_records: usize,
    pub records: Vec<InspectRow>,
    pub skipped: Vec<MalformedLine>,
}

impl InspectReport {
    pub fn build(
        file: &Path,
        batch: &ParsedBatch,
        window: &RecordWindow,
        total_lines: usize,
        skipped: Vec<MalformedLine>,
    ) -> Self {
        let records = window
            .indices(batch.len())
            .into_iter()
            .filter_map(|idx| {
                batch.get(idx).map(|view| InspectRow {
                    nr: idx + 1,
                    record: view.to_record(),
                })
            })
            .collect();

        Self {
            source: file.display().to_string(),
            total_lines,
            total_records: batch.len(),
            records,
            skipped,
        }
    }
}

impl Render for InspectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{:<5} {:<20} {:<20} {:<20} {:<30} {:<18} {:<13} {:<10}",
            "Nr", "Timestamp", "Service", "Eventtype", "User", "IP", "Status", "Validity"
        )?;
        writeln!(w, "{}", "-".repeat(TABLE_WIDTH))?;

        for row in &self.records {
            let record = &row.record;
            writeln!(
                w,
                "{:<5} {:<20} {:<20} {:<20} {:<30} {:<18} {} {:<10}",
                row.nr,
                record.timestamp_text(),
                record.service,
                record.event_type.as_deref().unwrap_or(""),
                record.user.as_deref().unwrap_or(""),
                record.source_ip,
                colorize_status(record.status, &format!("{:<13}", record.status)),
                record.validity,
            )?;
        }

        writeln!(w)?;
        writeln!(
            w,
            "Showing {} of {} records ({} lines read, {} skipped) from {}",
            self.records.len(),
            self.total_records,
            self.total_lines,
            self.skipped.len(),
            self.source.bold()
        )?;

        for line in &self.skipped {
            writeln!(
                w,
                "  {} line {}: {}",
                "skipped".yellow(),
                line.line_number,
                line.reason
            )?;
        }

        Ok(())
    }
}

/// Color a pre-padded status cell.
fn colorize_status(status: Status, cell: &str) -> ColoredString {
    match status {
        Status::Success => cell.green(),
        Status::Failed => cell.red(),
        Status::Neutral => cell.yellow(),
        Status::Info => cell.cyan(),
        Status::Unknown => cell.bright_black(),
    }
}
