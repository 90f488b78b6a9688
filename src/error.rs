//! Error types for the dxf-geom library

use std::io;
use thiserror::Error;

/// Main error type for conversion operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred while reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing the record stream
    #[error("Parse error: {0}")]
    Parse(String),

    /// The geometry sink rejected a payload
    #[error("Sink error: {0}")]
    Sink(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, DxfError>;

impl From<String> for DxfError {
    fn from(s: String) -> Self {
        DxfError::Custom(s)
    }
}

impl From<&str> for DxfError {
    fn from(s: &str) -> Self {
        DxfError::Custom(s.to_string())
    }
}
