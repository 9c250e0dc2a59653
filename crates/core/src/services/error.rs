//! Error type shared by all capability interfaces.

use thiserror::Error;

/// Errors returned by a remote service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The service answered with an error.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local I/O failure (reading the recording, writing the outbox, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Creates an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether a repeat of the same call could plausibly succeed.
    ///
    /// The pipeline never retries on its own; this only feeds log output.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::NotFound(_) | Self::InvalidResponse(_) | Self::Io(_) => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_connect() {
            ServiceError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            ServiceError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            ServiceError::api(status.as_u16(), e.to_string())
        } else {
            ServiceError::ConnectionFailed(e.to_string())
        }
    }
}
