//! Error types for OCR operations.

use mailveil_redact::ErrorKind;

/// Result type alias for OCR operations.
pub type Result<T> = std::result::Result<T, Error>;

/// OCR error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("OCR service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// No API key configured.
    #[error("No OCR API key configured")]
    MissingApiKey,

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::MissingApiKey => ErrorKind::Transport,
            Self::Json(_) => ErrorKind::Malformed,
        }
    }
}
