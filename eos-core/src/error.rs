//! Error types for eos-core

use thiserror::Error;

/// Main error type for the eos-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Rejected user input (blank name, negative hours, non-finite score, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// Statistics requested for a field the snapshot records don't have
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// Statistics requested over a snapshot with no records
    #[error("cannot compute statistics over an empty snapshot")]
    EmptySnapshot,

    /// Student not found
    #[error("student not found: {0}")]
    StudentNotFound(i64),

    /// Grade not found
    #[error("grade not found: {0}")]
    GradeNotFound(i64),

    /// Chart could not be rendered
    #[error("chart rendering error: {0}")]
    Render(String),
}

/// Result type alias for eos-core
pub type Result<T> = std::result::Result<T, Error>;
