//! Error types for email dispatch.

use mailveil_redact::ErrorKind;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Dispatch error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the message.
    #[error("{provider} returned {status}: {body}")]
    Rejected {
        /// Transport name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The transport has no API key configured.
    #[error("{0} API key not set")]
    MissingCredentials(&'static str),

    /// The message has no valid recipient.
    #[error("No recipient address")]
    NoRecipients,

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Rejected { .. } | Self::MissingCredentials(_) => {
                ErrorKind::Transport
            }
            Self::NoRecipients => ErrorKind::Validation,
            Self::Json(_) => ErrorKind::Malformed,
        }
    }
}
