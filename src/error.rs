//! Error types for the scam honeypot.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Classifier artifact errors. Any of these is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported model artifact version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// Final report delivery errors. Logged, never surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report request to {sink} failed: {reason}")]
    RequestFailed { sink: String, reason: String },

    #[error("Report rejected by {sink} with status {status}")]
    Rejected { sink: String, status: u16 },

    #[error("Report delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Offline training errors.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("Dataset line {line} is invalid: {reason}")]
    InvalidSample { line: usize, reason: String },

    #[error("Dataset is unusable: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
