//! Error types for the Quarry library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Quarry operations.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty file or no rows left to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A referenced column does not exist in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The measure column cannot be aggregated.
    #[error("Invalid measure '{column}': {reason}")]
    InvalidMeasure { column: String, reason: String },

    /// Insight type name not in the catalogue.
    #[error("Unknown insight type: {0}")]
    UnknownInsightType(String),

    /// Measure transformation could not be applied.
    #[error("Transform error: {0}")]
    Transform(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;
