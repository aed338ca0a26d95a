//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//! Folding samples into a tree never fails; errors only arise at the edges
//! (reading producer input, writing reports).

use thiserror::Error;

/// Errors that can occur while parsing producer samples
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid sample format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported sample schema version: {0}")]
    UnsupportedVersion(String),
}

/// Errors that can occur during file input and output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Failed to parse samples: {0}")]
    Parse(#[from] ParseError),
}
