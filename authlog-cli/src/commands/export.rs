//! `authlog export` command handler

use std::fs::File;
use std::io::{BufWriter, Write};

use serde::Serialize;
use tracing::info;

use authlog_core::config::AuthlogConfig;
use authlog_core::types::{ParsedBatch, RecordView, Status, Validity};

use crate::cli::{ExportArgs, ExportFormat};
use crate::commands::classify_file;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `export` command.
///
/// Data goes to `--out` when given, otherwise to stdout. A summary is
/// rendered only when the data went to a file.
pub async fn execute(
    args: ExportArgs,
    config: &AuthlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = classify_file(&args.file, config, args.skip_malformed).await?;

    match &args.out {
        Some(path) => {
            let file = File::create(path)?;
            let mut out = BufWriter::new(file);
            write_batch(&mut out, &report.batch, args.format)?;
            out.flush()?;

            info!(path = %path.display(), records = report.batch.len(), "export written");

            writer.render(&ExportSummary {
                source: args.file.display().to_string(),
                destination: path.display().to_string(),
                format: format_name(args.format).to_owned(),
                records: report.batch.len(),
                skipped: report.skipped.len(),
            })?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_batch(&mut out, &report.batch, args.format)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Serialize the whole batch in the requested format.
pub fn write_batch<W: Write>(
    w: &mut W,
    batch: &ParsedBatch,
    format: ExportFormat,
) -> Result<(), CliError> {
    match format {
        ExportFormat::Csv => write_csv(w, batch),
        ExportFormat::Json => write_json(w, batch),
    }
}

/// CSV with a header row. Absent fields are empty cells.
fn write_csv<W: Write>(w: &mut W, batch: &ParsedBatch) -> Result<(), CliError> {
    let mut csv_writer = csv::Writer::from_writer(w);
    for view in batch.iter() {
        csv_writer.serialize(CsvRow::from(view))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// JSON array of records. Absent fields are `null`.
fn write_json<W: Write>(w: &mut W, batch: &ParsedBatch) -> Result<(), CliError> {
    let records: Vec<RecordView<'_>> = batch.iter().collect();
    serde_json::to_writer_pretty(&mut *w, &records)?;
    writeln!(w)?;
    Ok(())
}

fn format_name(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    }
}

/// Flat CSV row; the timestamp tokens are joined with a space.
#[derive(Serialize)]
struct CsvRow<'a> {
    timestamp: String,
    service: &'a str,
    event_type: Option<&'a str>,
    user: Option<&'a str>,
    source_ip: &'a str,
    status: Status,
    validity: Validity,
}

impl<'a> From<RecordView<'a>> for CsvRow<'a> {
    fn from(view: RecordView<'a>) -> Self {
        Self {
            timestamp: view.timestamp_text(),
            service: view.service,
            event_type: view.event_type,
            user: view.user,
            source_ip: view.source_ip,
            status: view.status,
            validity: view.validity,
        }
    }
}

/// Summary printed after writing an export file.
#[derive(Serialize)]
pub struct ExportSummary {
    pub source: String,
    pub destination: String,
    pub format: String,
    pub records: usize,
    pub skipped: usize,
}

impl Render for ExportSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Exported {} records from {} to {} ({})",
            self.records.to_string().green().bold(),
            self.source,
            self.destination.bold(),
            self.format
        )?;
        if self.skipped > 0 {
            writeln!(w, "  {} malformed lines skipped", self.skipped.to_string().yellow())?;
        }
        Ok(())
    }
}
