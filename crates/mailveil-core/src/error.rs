//! Error types for the core library.

use crate::session::Step;
use crate::validation::ValidationError;
use mailveil_redact::ErrorKind;
use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// User input was rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session is not in a step that allows the operation.
    #[error("Cannot {operation} while in the {step} step")]
    InvalidStep {
        /// Attempted operation.
        operation: &'static str,
        /// Current step.
        step: Step,
    },

    /// No uploaded image at this index.
    #[error("No image at index {0}")]
    ImageIndex(usize),
}

impl Error {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::Config(_)
            | Self::InvalidStep { .. }
            | Self::ImageIndex(_) => ErrorKind::Validation,
            Self::Serde(_) => ErrorKind::Malformed,
            Self::Io(_) => ErrorKind::Transport,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
