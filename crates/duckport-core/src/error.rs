//! Error types for duckport

use thiserror::Error;

/// Core error type for duckport operations
#[derive(Error, Debug)]
pub enum DuckportError {
    #[error("Invalid database path: {0}")]
    InvalidPath(String),

    #[error("Table '{0}' does not exist in the database")]
    TableNotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for duckport operations
pub type Result<T> = std::result::Result<T, DuckportError>;
