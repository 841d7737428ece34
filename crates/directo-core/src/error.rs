//! Error types for directo-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in directo-core
#[derive(Debug, Error)]
pub enum Error {
    /// A sheet row is missing a field needed to identify or place a record
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    /// A child record has no usable value for a field the formatter needs
    #[error("record '{key}' has no value for '{field}'")]
    MissingAttribute { key: String, field: String },

    /// Grade code with no display form
    #[error("unknown grade code '{0}'")]
    UnknownGrade(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A sheet range that cannot be resolved against a grid
    #[error("invalid sheet range '{range}': {message}")]
    InvalidRange { range: String, message: String },

    /// Failed to parse the config file
    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An access token was required but not found in the environment
    #[error("no access token found in environment variable '{0}'")]
    MissingToken(String),

    /// HTTP transport error talking to a remote service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// An edit the document could not apply
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    /// Document id not known to the document service
    #[error("document '{0}' not found")]
    DocumentNotFound(String),

    /// The document snapshot contains no table after one was inserted
    #[error("no table found in document '{0}'")]
    TableNotFound(String),

    /// The last row already holds content; a row must be appended first
    #[error("row {0} has already been filled; append a row before filling again")]
    RowAlreadyFilled(usize),

    /// A row fill unit whose width does not match the table
    #[error("row fill has {found} columns but the table has {expected}")]
    ColumnMismatch { expected: usize, found: usize },

    /// The document service rejects empty insertions
    #[error("refusing to insert empty text at index {0}")]
    EmptyText(usize),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
