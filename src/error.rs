//! Custom error types for the reporting engine
//!
//! This module defines the error hierarchy using thiserror. Per-record and
//! per-reference problems are modeled here too, but the aggregation pass
//! never returns them: they degrade to flags on the records instead.

use thiserror::Error;

/// The main error type for reporting engine operations
#[derive(Error, Debug)]
pub enum ReportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for inputs supplied by the caller
    #[error("Validation error: {0}")]
    Validation(String),

    /// A raw record could not be normalized cleanly
    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A budget or income reference is zero or absent
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// The external data source failed to deliver records
    #[error("Fetch failure: {0}")]
    FetchFailure(String),

    /// One export format could not be rendered
    #[error("Failed to render {format} export: {message}")]
    ExportRender {
        format: &'static str,
        message: String,
    },

    /// A zone was requested for a scope the engine does not know
    #[error("Unknown scope: {0}")]
    UnknownScope(String),

    /// The sync session has been torn down
    #[error("Sync session has been shut down")]
    SyncStopped,
}

impl ReportError {
    /// Create a render error for a specific export format
    pub fn render(format: &'static str, message: impl Into<String>) -> Self {
        Self::ExportRender {
            format,
            message: message.into(),
        }
    }

    /// Check if this is a fetch failure
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::FetchFailure(_))
    }

    /// Check if this is an export render failure
    pub fn is_export_failure(&self) -> bool {
        matches!(self, Self::ExportRender { .. })
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        Self::render("csv", err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::render("spreadsheet", err.to_string())
    }
}

/// Result type alias for reporting engine operations
pub type ReportResult<T> = Result<T, ReportError>;
