//! Error types for the canvas controller

use thiserror::Error;

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while drawing, encoding or uploading snapshots
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to encode the pixel surface
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The storage collaborator rejected an object
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Network error while talking to the storage collaborator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Malformed pointer-event input
    #[error("Invalid input at line {line}: {reason}")]
    InputError { line: usize, reason: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::RenderError(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageError(err.to_string())
    }
}
