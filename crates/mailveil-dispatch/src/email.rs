//! Outgoing message model.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A message ready for dispatch.
///
/// Address fields hold the raw user input; transports split them with
/// [`split_addresses`]. The sender is configured per transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Primary recipients, separated by `,` or `;`.
    pub to: String,
    /// Carbon-copy recipients, separated by `,` or `;`.
    pub cc: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body_text: String,
    /// File attachments.
    pub attachments: Vec<Attachment>,
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment for the `index`-th image (zero-based).
    ///
    /// The file is named `image_N.<ext>` with `N` starting at 1 and the
    /// extension taken from the sniffed format, PNG if unknown.
    #[must_use]
    pub fn image(index: usize, data: Vec<u8>) -> Self {
        let (extension, content_type) = image::guess_format(&data).map_or(("png", "image/png"), |format| {
            (
                format.extensions_str().first().copied().unwrap_or("png"),
                format.to_mime_type(),
            )
        });

        Self {
            filename: format!("image_{}.{extension}", index + 1),
            content_type: content_type.to_string(),
            data,
        }
    }

    /// Contents as standard base64.
    #[must_use]
    pub fn base64_content(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

impl OutgoingEmail {
    /// Creates a message without attachments or cc.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body_text: body_text.into(),
            ..Self::default()
        }
    }

    /// Sets the cc field.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }

    /// Attaches images in order as `image_1`, `image_2`, ...
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let start = self.attachments.len();
        self.attachments.extend(
            images
                .into_iter()
                .enumerate()
                .map(|(i, data)| Attachment::image(start + i, data)),
        );
        self
    }

    /// Primary recipient addresses.
    #[must_use]
    pub fn to_addresses(&self) -> Vec<String> {
        split_addresses(&self.to)
    }

    /// Cc addresses, empty when the whole cc field repeats the to field.
    ///
    /// See [`deduplicate_cc`]; a cc that differs from `to` is passed through
    /// unchanged even if some of its addresses also appear in `to`.
    #[must_use]
    pub fn cc_addresses(&self) -> Vec<String> {
        split_addresses(&deduplicate_cc(&self.to, &self.cc))
    }
}

/// Returns the effective cc: empty when it repeats `to`, otherwise unchanged.
///
/// Comparison ignores case and surrounding whitespace.
#[must_use]
pub fn deduplicate_cc(to: &str, cc: &str) -> String {
    let cc_normalized = cc.trim().to_lowercase();
    if !cc_normalized.is_empty() && cc_normalized == to.trim().to_lowercase() {
        String::new()
    } else {
        cc.to_string()
    }
}

/// Splits an address list on `,` and `;`, trimming and dropping empties.
#[must_use]
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
