//! Body-text redaction.

use crate::client::AiClient;
use crate::error::Result;
use crate::prompt::text_prompt;
use mailveil_redact::{FeedbackSink, RedactionSettings};
use tracing::{debug, info};

/// Temperature for text rewriting.
const TEXT_TEMPERATURE: f32 = 0.3;

/// Result of redacting a body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRedaction {
    /// The redacted text.
    pub text: String,
    /// Tokens billed, or `None` when no request was made.
    pub tokens_used: Option<u64>,
}

impl TextRedaction {
    /// A result that returns the input unchanged without a remote call.
    #[must_use]
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens_used: None,
        }
    }
}

impl AiClient {
    /// Rewrites `text` with every enabled category replaced by its placeholder.
    ///
    /// Empty text, or settings with nothing enabled, return the input as is
    /// without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is unusable.
    /// Callers are expected to fall back to the original text.
    pub async fn redact_text(
        &self,
        text: &str,
        settings: &RedactionSettings,
        feedback: &impl FeedbackSink,
    ) -> Result<TextRedaction> {
        if text.is_empty() {
            debug!("Empty body, skipping text redaction");
            return Ok(TextRedaction::unchanged(text));
        }

        let Some(prompt) = text_prompt(text, settings) else {
            feedback.emit("No redaction categories enabled, body text left unchanged");
            return Ok(TextRedaction::unchanged(text));
        };

        feedback.emit("Connecting to language model...");
        feedback.emit("Sending body text for redaction...");

        let completion = self.complete(&prompt, TEXT_TEMPERATURE).await?;
        let tokens = completion.total_tokens.unwrap_or(0);

        info!("Text redaction complete ({tokens} tokens)");
        feedback.emit(&format!("Text redaction complete ({tokens} tokens used)"));

        Ok(TextRedaction {
            text: completion.content,
            tokens_used: Some(tokens),
        })
    }
}
