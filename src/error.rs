//! Error types for the signature sheet

use thiserror::Error;

/// Result type alias for sheet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the ambient layers (storage, codec, config, roster).
///
/// Surface drawing operations never return these; they degrade to no-ops and
/// log instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Encoding or decoding a persisted image failed
    #[error("Image codec error: {0}")]
    CodecError(String),

    /// The key-value store could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Roster could not be loaded
    #[error("Invalid roster: {0}")]
    RosterError(String),

    /// A row index outside the mounted roster
    #[error("No such row: {0}")]
    UnknownRow(usize),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::CodecError(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::CodecError(format!("invalid base64 payload: {}", err))
    }
}
