//! Error types for the fitlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity rejected by its own validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures that left the in-memory store ahead of the file.
    ///
    /// Callers can retry `RecordStore::save_data` after these.
    pub fn is_flush_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Json(_))
    }
}
