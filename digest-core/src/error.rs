//! Error types for the digest

use thiserror::Error;

/// Digest-wide error type surfaced at the service boundary
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DigestError {
    pub fn api(msg: impl Into<String>) -> Self {
        DigestError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        DigestError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        DigestError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DigestError::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        DigestError::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DigestError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DigestError::Internal(msg.into())
    }
}

/// Result type alias for digest operations
pub type DigestResult<T> = Result<T, DigestError>;
