/// Core error types for Music Time
use crate::types::PlayerBackend;
use thiserror::Error;

/// Result type alias using `MusicTimeError`
pub type Result<T> = std::result::Result<T, MusicTimeError>;

/// Core error type for Music Time
#[derive(Error, Debug)]
pub enum MusicTimeError {
    /// Player application is not running or its API is unreachable
    #[error("{backend} is unavailable: {message}")]
    BackendUnavailable {
        backend: PlayerBackend,
        message: String,
    },

    /// Player rejected the request
    #[error("{backend} rejected request ({status}): {message}")]
    Rejected {
        backend: PlayerBackend,
        status: u16,
        message: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// AppleScript / process execution errors
    #[error("Script error: {0}")]
    Script(String),

    /// Player response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MusicTimeError {
    /// Create a backend unavailable error
    pub fn unavailable(backend: PlayerBackend, msg: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            message: msg.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a script error
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the error is a transient unavailability that may clear on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. } | Self::Network(_))
    }
}
