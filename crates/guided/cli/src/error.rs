//! CLI error types

use guided_types::GuidedError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine rejected a definition, snapshot or operation
    #[error(transparent)]
    Engine(#[from] GuidedError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// One or more definitions failed validation
    #[error("{0} definition(s) failed validation")]
    ValidationFailed(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
