//! Error types for language-model operations.

use mailveil_redact::ErrorKind;

/// Result type alias for language-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Language-model error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// No API key configured.
    #[error("No API key configured for the language model")]
    MissingApiKey,

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response had no message content.
    #[error("Response contained no message content")]
    EmptyResponse,

    /// The response content had the wrong shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::MissingApiKey => ErrorKind::Transport,
            Self::Json(_) | Self::EmptyResponse | Self::InvalidResponse(_) => ErrorKind::Malformed,
        }
    }
}
