//! CLI-specific error types and exit code mapping

use authlog_classifier::ClassifierError;
use authlog_core::error::AuthlogError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// CSV serialisation failed during export.
    #[error("csv output error: {0}")]
    CsvSerialize(#[from] csv::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from authlog-core.
    #[error("{0}")]
    Core(#[from] AuthlogError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | General / command error                  |
    /// | 2    | Configuration error                      |
    /// | 3    | Log source error (missing, wrong type)   |
    /// | 5    | Malformed log line                       |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(AuthlogError::Config(_)) => 2,
            Self::Core(AuthlogError::Source(_)) => 3,
            Self::Core(AuthlogError::Parse(_)) => 5,
            Self::Io(_) | Self::Core(AuthlogError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::CsvSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<ClassifierError> for CliError {
    fn from(e: ClassifierError) -> Self {
        Self::Core(e.into())
    }
}
