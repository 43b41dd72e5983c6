//! Error types for s3h-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for s3h-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3h-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid local path or remote key
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication or permission error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2, // UsageError
            Error::Config(_) | Error::Json(_) | Error::InvalidUrl(_) => 2,
            Error::Network(_) => 3, // NetworkError
            Error::Auth(_) => 4,    // AuthError
            Error::NotFound(_) => 5, // NotFound
            _ => 1,                 // GeneralError
        }
    }
}
