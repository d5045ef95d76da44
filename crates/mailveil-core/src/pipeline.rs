//! Image redaction pipeline.
//!
//! OCR, classification, merging and compositing for one image at a time.
//! Every failure falls back to the original image bytes.

use mailveil_ai::{AiClient, find_sensitive_boxes};
use mailveil_ocr::OcrClient;
use mailveil_redact::{
    ErrorKind, FeedbackSink, LabelFont, RedactionSettings, SensitivityMap, TextBox,
    redact_image_bytes,
};
use std::future::Future;
use tracing::{debug, info, warn};

/// Pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Text extraction.
    Ocr,
    /// Box classification.
    Classification,
    /// Body-text redaction.
    TextRedaction,
    /// Drawing and re-encoding.
    Compositing,
}

impl Stage {
    /// Human-readable stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ocr => "OCR",
            Self::Classification => "Classification",
            Self::TextRedaction => "Text redaction",
            Self::Compositing => "Compositing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component failure, reduced to what the pipeline needs to report it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed ({kind}): {message}")]
pub struct StageError {
    /// Where it failed.
    pub stage: Stage,
    /// Failure class.
    pub kind: ErrorKind,
    /// Underlying error message.
    pub message: String,
}

impl StageError {
    /// Creates a stage error.
    #[must_use]
    pub fn new(stage: Stage, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }
}

/// Result type for pipeline stages.
pub type StageResult<T> = std::result::Result<T, StageError>;

/// Extracts word boxes from an encoded image.
pub trait TextExtractor: Send + Sync {
    /// Returns the word boxes; an image without text yields an empty list.
    fn extract_boxes(
        &self,
        image: &[u8],
        feedback: &dyn FeedbackSink,
    ) -> impl Future<Output = StageResult<Vec<TextBox>>> + Send;
}

/// Assigns categories to word boxes.
pub trait BoxClassifier: Send + Sync {
    /// Returns box index to category for the sensitive boxes.
    fn classify(
        &self,
        boxes: &[TextBox],
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> impl Future<Output = StageResult<SensitivityMap>> + Send;
}

/// Rewrites body text with placeholders.
pub trait TextClassifier: Send + Sync {
    /// Returns the redacted text.
    fn redact(
        &self,
        text: &str,
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> impl Future<Output = StageResult<String>> + Send;
}

impl TextExtractor for OcrClient {
    async fn extract_boxes(&self, image: &[u8], feedback: &dyn FeedbackSink) -> StageResult<Vec<TextBox>> {
        self.extract_text_with_boxes(image, &feedback)
            .await
            .map_err(|e| StageError::new(Stage::Ocr, e.kind(), e.to_string()))
    }
}

impl BoxClassifier for AiClient {
    async fn classify(
        &self,
        boxes: &[TextBox],
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> StageResult<SensitivityMap> {
        self.classify_boxes(boxes, settings, &feedback)
            .await
            .map_err(|e| StageError::new(Stage::Classification, e.kind(), e.to_string()))
    }
}

impl TextClassifier for AiClient {
    async fn redact(
        &self,
        text: &str,
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> StageResult<String> {
        self.redact_text(text, settings, &feedback)
            .await
            .map(|r| r.text)
            .map_err(|e| StageError::new(Stage::TextRedaction, e.kind(), e.to_string()))
    }
}

/// Redacts images with an extractor and a classifier.
#[derive(Debug)]
pub struct ImagePipeline<E, C> {
    extractor: E,
    classifier: C,
    font: LabelFont,
}

impl<E: TextExtractor, C: BoxClassifier> ImagePipeline<E, C> {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(extractor: E, classifier: C, font: LabelFont) -> Self {
        Self {
            extractor,
            classifier,
            font,
        }
    }

    /// Redacts one image.
    ///
    /// Returns the original bytes when no text or nothing sensitive is found,
    /// or when any stage fails.
    pub async fn redact_image(
        &self,
        image: &[u8],
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> Vec<u8> {
        match self.try_redact_image(image, settings, feedback).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("{err}; keeping original image");
                let reason = match err.kind {
                    ErrorKind::Transport => "service unavailable",
                    ErrorKind::Malformed => "unreadable response",
                    ErrorKind::Validation => "rejected input",
                };
                feedback.emit(&format!(
                    "{} failed ({reason}): {}. Image left unredacted.",
                    err.stage.as_str(),
                    err.message
                ));
                image.to_vec()
            }
        }
    }

    /// Redacts images strictly in order, one at a time.
    pub async fn redact_images(
        &self,
        images: &[Vec<u8>],
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> Vec<Vec<u8>> {
        if images.is_empty() {
            feedback.emit("No images to process");
            return Vec::new();
        }

        feedback.emit(&format!("Processing {} image(s)...", images.len()));

        let mut redacted = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            feedback.emit(&format!("Processing image {}/{}...", index + 1, images.len()));
            redacted.push(self.redact_image(image, settings, feedback).await);
        }

        feedback.emit(&format!("All {} image(s) processed", images.len()));
        redacted
    }

    async fn try_redact_image(
        &self,
        image: &[u8],
        settings: &RedactionSettings,
        feedback: &dyn FeedbackSink,
    ) -> StageResult<Vec<u8>> {
        let boxes = self.extractor.extract_boxes(image, feedback).await?;
        if boxes.is_empty() {
            debug!("No text detected, image unchanged");
            feedback.emit("No text detected in image");
            return Ok(image.to_vec());
        }

        let map = self.classifier.classify(&boxes, settings, feedback).await?;
        let sensitive = find_sensitive_boxes(&boxes, &map, settings);
        if sensitive.is_empty() {
            feedback.emit("No sensitive information detected in image");
            return Ok(image.to_vec());
        }

        feedback.emit(&format!(
            "Drawing redaction boxes over {} sensitive area(s)...",
            sensitive.len()
        ));

        let redacted = redact_image_bytes(image, &sensitive, settings, &self.font)
            .map_err(|e| StageError::new(Stage::Compositing, e.kind(), e.to_string()))?;

        info!("Redacted {} area(s) in image", sensitive.len());
        feedback.emit("Image redaction complete");
        Ok(redacted)
    }
}
