//! Error types for `shelfscan` core library.

use thiserror::Error;

/// Result type alias using `shelfscan` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `shelfscan` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Scanned token rejected
    #[error(transparent)]
    Token(#[from] crate::token::TokenError),

    /// Value outside its accepted range (hours, return days)
    #[error("{what} must be between {min} and {max}, got {value}")]
    OutOfRange {
        what: &'static str,
        min: u8,
        max: u8,
        value: i64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
