//! Error types for ImageGuard

/// Result type alias using ImageGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ImageGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Analyzer invocation errors (recovered locally via fallbacks)
    #[error("analyzer error: {0}")]
    Analyzer(String),

    /// Policy evaluation errors
    #[error("policy error: {0}")]
    Policy(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Request-level input errors (unreadable image, missing field)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new analyzer error
    pub fn analyzer(msg: impl Into<String>) -> Self {
        Self::Analyzer(msg.into())
    }

    /// Create a new policy error
    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
