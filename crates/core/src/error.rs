//! Error types shared across FramePipe crates

use thiserror::Error;

/// Result type alias for FramePipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for FramePipe nodes and drivers
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration value failed validation or coercion
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Node setup failed (missing input file, unwritable output path, ...)
    #[error("Setup failed: {0}")]
    Setup(String),

    /// General execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
