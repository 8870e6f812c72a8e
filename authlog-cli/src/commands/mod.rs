//! Command handlers -- one module per subcommand

pub mod config;
pub mod export;
pub mod inspect;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use authlog_classifier::{
    AuthLogClassifier, BatchParser, BatchReport, ClassificationTables, LogSource, MalformedPolicy,
};
use authlog_core::config::AuthlogConfig;

use crate::error::CliError;

/// Load the effective configuration.
///
/// With no path, defaults plus `AUTHLOG_*` overrides apply. A path that
/// does not exist is a configuration error.
pub async fn load_config(path: Option<&Path>) -> Result<AuthlogConfig, CliError> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration file");
            AuthlogConfig::load(path).await?
        }
        None => AuthlogConfig::from_env()?,
    };
    Ok(config)
}

/// Read a log file and classify every line.
///
/// `skip_malformed` forces the `Skip` policy regardless of `[classifier] on_malformed`.
pub async fn classify_file(
    file: &Path,
    config: &AuthlogConfig,
    skip_malformed: bool,
) -> Result<BatchReport, CliError> {
    let tables = ClassificationTables::from_config(&config.classifier).await?;
    let source = LogSource::open(file, &config.source).await?;

    let mut parser = BatchParser::from_config(AuthLogClassifier::new(Arc::new(tables)), config)?;
    if skip_malformed {
        parser = parser.with_policy(MalformedPolicy::Skip);
    }

    let report = parser.parse(source.lines())?;

    info!(
        file = %file.display(),
        lines = report.total_lines,
        records = report.batch.len(),
        skipped = report.skipped.len(),
        policy = %parser.policy(),
        "log file classified"
    );

    Ok(report)
}
