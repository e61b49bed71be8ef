//! Error types for pinmap

use thiserror::Error;

/// Main error type for pinmap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Script load failed: {0}")]
    ScriptLoad(String),

    #[error("Map container not found: #{0}")]
    MountPointMissing(String),

    #[error("Map library error: {0}")]
    Library(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pinmap operations
pub type Result<T> = std::result::Result<T, Error>;
