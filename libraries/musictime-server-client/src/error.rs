//! Error types for the Music Time service client.

use thiserror::Error;

/// Errors that can occur when talking to the Music Time service.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Request needs a session token but none is configured
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid service URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// IO error while writing the dashboard file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl ServerClientError {
    /// Map a transport error, separating unreachable hosts from other failures
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ServerClientError::ServerUnreachable(e.to_string())
        } else {
            ServerClientError::Request(e)
        }
    }
}

/// Result type for service client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;
