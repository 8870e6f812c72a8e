//! `authlog config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use authlog_classifier::{ClassificationTables, MalformedPolicy};
use authlog_core::config::AuthlogConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Configuration sections accepted by `config show --section`.
const SECTIONS: [&str; 4] = ["general", "classifier", "source", "output"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

fn source_label(config_path: Option<&Path>) -> String {
    config_path.map_or_else(
        || "(defaults + environment)".to_owned(),
        |p| p.display().to_string(),
    )
}

/// Execute the config validate subcommand.
///
/// Loads the configuration, then the classification tables it names,
/// and reports every failure found.
async fn execute_validate(
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(source = %source, "validating configuration");

    let errors = match load_config(config_path).await {
        Ok(config) => validate_classifier_section(&config).await,
        Err(e) => vec![e.to_string()],
    };

    let report = ConfigValidationReport {
        source,
        valid: errors.is_empty(),
        errors,
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Check that the malformed-line policy parses and the tables load.
async fn validate_classifier_section(config: &AuthlogConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = config.classifier.on_malformed.parse::<MalformedPolicy>() {
        errors.push(e.to_string());
    }
    if let Err(e) = ClassificationTables::from_config(&config.classifier).await {
        errors.push(e.to_string());
    }

    errors
}

/// Execute the config show subcommand.
///
/// Displays the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let report = build_config_report(&config, source_label(config_path), section)?;
    writer.render(&report)?;
    Ok(())
}

fn build_config_report(
    config: &AuthlogConfig,
    source: String,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("classifier") => toml::to_string_pretty(&config.classifier),
        Some("source") => toml::to_string_pretty(&config.source),
        Some("output") => toml::to_string_pretty(&config.output),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    }
    .map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))?;

    Ok(ConfigReport {
        source,
        section,
        config: config.clone(),
        config_toml,
    })
}

/// Configuration display report.
///
/// Text output shows the serialized TOML; JSON output carries the config itself.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration source (file path or defaults)
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Effective configuration
    pub config: AuthlogConfig,
    /// Serialized TOML for the selected section
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration source
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report: &impl Render) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_config_report_full_config() {
        let report =
            build_config_report(&AuthlogConfig::default(), "authlog.toml".to_owned(), None)
                .expect("report");
        let output = render(&report);
        assert!(output.contains("Configuration (source: authlog.toml)"));
        assert!(output.contains("[general]"));
        assert!(output.contains("[classifier]"));
        assert!(output.contains("on_malformed = \"abort\""));
        assert!(output.contains("max_line_bytes = 65536"));
    }

    #[test]
    fn test_config_report_single_section() {
        let report = build_config_report(
            &AuthlogConfig::default(),
            "authlog.toml".to_owned(),
            Some("output".to_owned()),
        )
        .expect("report");
        let output = render(&report);
        assert!(output.contains("[output]"), "should show section name");
        assert!(output.contains("limit = 10"));
        assert!(!output.contains("log_level"));
    }

    #[test]
    fn test_config_report_unknown_section() {
        let result = build_config_report(
            &AuthlogConfig::default(),
            "authlog.toml".to_owned(),
            Some("network".to_owned()),
        );
        match result {
            Err(CliError::Command(msg)) => {
                assert!(msg.contains("unknown section: network"));
                assert!(msg.contains("classifier"));
            }
            _ => panic!("expected Command error"),
        }
    }

    #[test]
    fn test_config_report_json_skips_toml_text() {
        let report = build_config_report(
            &AuthlogConfig::default(),
            "authlog.toml".to_owned(),
            Some("source".to_owned()),
        )
        .expect("report");
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["section"], "source");
        assert!(json.get("config_toml").is_none());
        assert_eq!(json["config"]["output"]["limit"], 10);
    }

    #[test]
    fn test_validation_report_render_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'general.log_level'".to_owned()],
        };
        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("general.log_level"));
    }

    #[tokio::test]
    async fn test_validate_classifier_section_defaults() {
        let errors = validate_classifier_section(&AuthlogConfig::default()).await;
        assert!(errors.is_empty(), "defaults should validate: {errors:?}");
    }

    #[tokio::test]
    async fn test_validate_classifier_section_missing_tables() {
        let mut config = AuthlogConfig::default();
        config.classifier.tables_path = "/nonexistent/tables.toml".to_owned();
        let errors = validate_classifier_section(&config).await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("tables.toml"));
    }
}
