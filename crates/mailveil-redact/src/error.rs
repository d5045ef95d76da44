//! Error types for redaction operations.

/// Result type alias for redaction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure at a component boundary.
///
/// Every component error in the workspace maps onto one of these so callers
/// can pick the safe default for that component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network failure, timeout or non-success status from a remote service.
    Transport,
    /// Response or input that could not be decoded.
    Malformed,
    /// User input rejected before any remote call.
    Validation,
}

impl ErrorKind {
    /// Short lowercase name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Malformed => "malformed",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redaction error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image bytes could not be decoded or re-encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The image format could not be determined from its bytes.
    #[error("Unrecognized image format")]
    UnknownFormat,
}

impl Error {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Image(_) | Self::UnknownFormat => ErrorKind::Malformed,
        }
    }
}
