//! Notemind error types

use thiserror::Error;

/// Notemind error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language model gateway error (network, auth, quota, or timeout)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Model output did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Storage read/write failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Notemind operations
pub type Result<T> = std::result::Result<T, Error>;
