//! Error types for userstream.

use thiserror::Error;

/// Fatal framing errors.
///
/// Any of these means byte alignment with the server is lost, so the
/// connection that produced it cannot be decoded any further.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Length line was terminated but contained no digits.
    #[error("empty length line")]
    EmptyLength,

    /// Length line contained something other than ASCII digits.
    #[error("malformed length line: {line:?}")]
    MalformedLength { line: String },

    /// Unterminated length prefix grew past the allowed digit count.
    #[error("length line exceeds {max_digits} digits without terminator")]
    LengthTooLong { max_digits: usize },

    /// Digits do not fit in a machine-sized length.
    #[error("length value overflows: {line:?}")]
    LengthOverflow { line: String },

    /// Declared payload length is above the configured limit.
    #[error("declared payload length {length} exceeds maximum {max}")]
    PayloadTooLarge { length: usize, max: usize },
}

/// Main error type for all userstream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport failure (connect, send, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Stream framing error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Request signing failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Caller supplied parameters that cannot produce a request.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// No async runtime to run the session on.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Session task ended without emitting its final event.
    #[error("Session task exited before closing")]
    Closed,
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Http(err.to_string())
    }
}

/// Result type alias using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;
