//! Error types for the translation pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of the fail-open translation path.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to write a report or log file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to serialize the run report.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A brand-name pattern failed to compile.
    #[error("Invalid brand pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The requested configuration cannot work with the chosen backend.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised by a translation backend for a single call.
///
/// The chunked translator never propagates these; they end up as the reason
/// of a fallback chunk.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The HTTP request could not be sent or completed.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("API responded with error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Body or message returned by the service
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The backend needs an API key and none was given.
    #[error("Missing API key for {0}")]
    MissingApiKey(String),

    /// The backend cannot honour the request (language, payload size).
    #[error("Unsupported request: {0}")]
    Unsupported(String),
}
