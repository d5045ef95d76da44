//! Draft validation.
//!
//! Runs before any remote call. Recipient lists accept `,` or `;` as
//! separators; uploads are limited in count and total size.

use mailveil_dispatch::split_addresses;
use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of attached images.
pub const MAX_IMAGES: usize = 4;

/// Maximum total size of attached images in bytes (5 MB).
pub const MAX_TOTAL_BYTES: usize = 5 * 1024 * 1024;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Recipient field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientField {
    /// Primary recipients.
    To,
    /// Carbon-copy recipients.
    Cc,
}

impl RecipientField {
    /// Field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::To => "to",
            Self::Cc => "cc",
        }
    }
}

/// Validation error for a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The to field is empty.
    MissingRecipient,
    /// Some addresses do not look like email addresses.
    InvalidAddresses {
        /// Offending field.
        field: RecipientField,
        /// Rejected addresses, in input order.
        addresses: Vec<String>,
    },
    /// The upload would exceed [`MAX_IMAGES`].
    TooManyImages {
        /// Images already attached.
        current: usize,
        /// Images in the new upload.
        new: usize,
    },
    /// The upload would exceed [`MAX_TOTAL_BYTES`].
    TooLarge {
        /// Bytes already attached.
        current_bytes: usize,
        /// Bytes in the new upload.
        new_bytes: usize,
    },
}

impl ValidationError {
    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingRecipient => "to",
            Self::InvalidAddresses { field, .. } => field.as_str(),
            Self::TooManyImages { .. } | Self::TooLarge { .. } => "images",
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRecipient => f.write_str("To email is required"),
            Self::InvalidAddresses { addresses, .. } => {
                write!(f, "Invalid email address(es): {}", addresses.join(", "))
            }
            Self::TooManyImages { current, new } => write!(
                f,
                "Maximum {MAX_IMAGES} images allowed. You have {current} image(s) and tried to upload {new} more."
            ),
            Self::TooLarge {
                current_bytes,
                new_bytes,
            } => write!(
                f,
                "Maximum 5 MB total size allowed. Current: {:.2} MB, New upload: {:.2} MB, Total: {:.2} MB.",
                megabytes(*current_bytes),
                megabytes(*new_bytes),
                megabytes(current_bytes + new_bytes)
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks whether a single address is well formed.
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address.trim())
}

fn invalid_addresses(raw: &str) -> Vec<String> {
    split_addresses(raw)
        .into_iter()
        .filter(|address| !is_valid_email(address))
        .collect()
}

/// Validates the to and cc fields.
///
/// `to` is required; `cc` may be empty.
///
/// # Errors
///
/// Returns the first failing field's error.
pub fn validate_recipients(to: &str, cc: &str) -> Result<(), ValidationError> {
    if to.trim().is_empty() {
        return Err(ValidationError::MissingRecipient);
    }

    for (field, raw) in [(RecipientField::To, to), (RecipientField::Cc, cc)] {
        let addresses = invalid_addresses(raw);
        if !addresses.is_empty() {
            return Err(ValidationError::InvalidAddresses { field, addresses });
        }
    }

    Ok(())
}

/// Validates adding `new` images to `existing` ones.
///
/// # Errors
///
/// Returns an error if the combined count or size exceeds the limits.
pub fn validate_uploads<E, N>(existing: &[E], new: &[N]) -> Result<(), ValidationError>
where
    E: AsRef<[u8]>,
    N: AsRef<[u8]>,
{
    if existing.len() + new.len() > MAX_IMAGES {
        return Err(ValidationError::TooManyImages {
            current: existing.len(),
            new: new.len(),
        });
    }

    let current_bytes: usize = existing.iter().map(|i| i.as_ref().len()).sum();
    let new_bytes: usize = new.iter().map(|i| i.as_ref().len()).sum();

    if current_bytes + new_bytes > MAX_TOTAL_BYTES {
        return Err(ValidationError::TooLarge {
            current_bytes,
            new_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("jane.doe+tag@example.co.uk"));
        assert!(is_valid_email(" bob@x.io "));
        assert!(!is_valid_email("bob@x"));
        assert!(!is_valid_email("bob x@y.io"));
        assert!(!is_valid_email("@y.io"));
    }

    #[test]
    fn test_to_required() {
        let err = validate_recipients("  ", "").unwrap_err();
        assert_eq!(err, ValidationError::MissingRecipient);
        assert_eq!(err.to_string(), "To email is required");
        assert_eq!(err.field(), "to");
    }

    #[test]
    fn test_invalid_addresses_listed() {
        let err = validate_recipients("a@x.io, nope; also-bad@", "").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email address(es): nope, also-bad@");
        assert_eq!(err.field(), "to");
    }

    #[test]
    fn test_cc_checked_after_to() {
        let err = validate_recipients("a@x.io", "b@x.io;broken").unwrap_err();
        assert_eq!(err.field(), "cc");
        assert!(validate_recipients("a@x.io; b@x.io", "").is_ok());
        assert!(validate_recipients("a@x.io", " ; ").is_ok());
    }

    #[test]
    fn test_too_many_images() {
        let existing = vec![vec![0u8; 10]; 3];
        let new = vec![vec![0u8; 10]; 2];
        let err = validate_uploads(&existing, &new).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Maximum 4 images allowed. You have 3 image(s) and tried to upload 2 more."
        );
        assert!(validate_uploads(&existing, &new[..1]).is_ok());
    }

    #[test]
    fn test_total_size_limit() {
        let existing = vec![vec![0u8; 3 * 1024 * 1024]];
        let new = vec![vec![0u8; 2 * 1024 * 1024 + 1]];
        let err = validate_uploads(&existing, &new).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Maximum 5 MB total size allowed. Current: 3.00 MB, New upload: 2.00 MB, Total: 5.00 MB."
        );
        assert_eq!(err.field(), "images");

        let exact = vec![vec![0u8; 2 * 1024 * 1024]];
        assert!(validate_uploads(&existing, &exact).is_ok());
    }
}
