//! Draft redaction: body text first, then each image.

use crate::config::Config;
use crate::pipeline::{BoxClassifier, ImagePipeline, TextClassifier, TextExtractor};
use mailveil_ai::AiClient;
use mailveil_ocr::OcrClient;
use mailveil_redact::{FeedbackSink, RedactionSettings};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// An email being composed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    /// Primary recipients, separated by `,` or `;`.
    pub to: String,
    /// Carbon-copy recipients.
    pub cc: String,
    /// Subject line. Never redacted.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Encoded images, in upload order.
    #[serde(skip)]
    pub images: Vec<Vec<u8>>,
}

/// Redacted body and images for preview and sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactedDraft {
    /// Body with placeholders.
    pub body: String,
    /// Images in the same order as the draft's.
    pub images: Vec<Vec<u8>>,
}

/// Redactor built from the configured remote services.
pub type RemoteRedactor = Redactor<AiClient, OcrClient, AiClient>;

/// Applies text and image redaction to a draft.
#[derive(Debug)]
pub struct Redactor<T, E, C> {
    text: T,
    images: ImagePipeline<E, C>,
}

impl RemoteRedactor {
    /// Builds the redactor from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let ai = config.ai_client();
        Self::new(
            ai.clone(),
            ImagePipeline::new(config.ocr_client(), ai, config.label_font()),
        )
    }
}

impl<T, E, C> Redactor<T, E, C>
where
    T: TextClassifier,
    E: TextExtractor,
    C: BoxClassifier,
{
    /// Creates a redactor.
    #[must_use]
    pub const fn new(text: T, images: ImagePipeline<E, C>) -> Self {
        Self { text, images }
    }

    /// Image pipeline.
    #[must_use]
    pub const fn images(&self) -> &ImagePipeline<E, C> {
        &self.images
    }

    /// Redacts the body, then the images one at a time.
    ///
    /// A text failure keeps the original body and is reported through
    /// `feedback`; image failures keep the original image.
    pub async fn redact_draft(
        &self,
        draft: &Draft,
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> RedactedDraft {
        let body = if draft.body.trim().is_empty() {
            draft.body.clone()
        } else {
            feedback.emit("Redacting email body...");
            match self.text.redact(&draft.body, settings, feedback).await {
                Ok(text) => text,
                Err(err) => {
                    warn!("{err}; keeping original body");
                    feedback.emit(&format!("Warning: {err}. Body left unredacted."));
                    draft.body.clone()
                }
            }
        };

        let images = if draft.images.is_empty() {
            Vec::new()
        } else {
            self.images.redact_images(&draft.images, settings, feedback).await
        };

        info!(
            "Draft redacted ({} image(s), body {})",
            images.len(),
            if body == draft.body { "unchanged" } else { "changed" }
        );
        feedback.emit("Redaction complete. Review the preview before sending.");

        RedactedDraft { body, images }
    }
}
