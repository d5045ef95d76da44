//! Compose, preview and send flow for one email.

use crate::delivery::Dispatcher;
use crate::error::{Error, Result};
use crate::pipeline::{BoxClassifier, TextClassifier, TextExtractor};
use crate::redactor::{Draft, RedactedDraft, Redactor};
use crate::validation::{validate_recipients, validate_uploads};
use mailveil_dispatch::{DeliveryReport, OutgoingEmail, deduplicate_cc};
use mailveil_redact::{FeedbackLog, FeedbackSink, RedactionSettings};
use std::fmt;
use tracing::{debug, info};

/// Where the session is in the compose flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    /// Editing the draft.
    #[default]
    Compose,
    /// Reviewing the redacted draft.
    Preview,
    /// Send attempted.
    Sent,
}

impl Step {
    /// Step name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compose => "compose",
            Self::Preview => "preview",
            Self::Sent => "sent",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one email from composing to sending.
#[derive(Debug, Default)]
pub struct Session {
    draft: Draft,
    settings: RedactionSettings,
    step: Step,
    feedback: FeedbackLog,
    original: Option<Draft>,
    redacted: Option<RedactedDraft>,
}

impl Session {
    /// Starts a session with the given redaction settings.
    #[must_use]
    pub fn new(settings: RedactionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Current draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Mutable draft, only while composing.
    ///
    /// # Errors
    ///
    /// Returns an error outside the compose step.
    pub fn draft_mut(&mut self) -> Result<&mut Draft> {
        self.require(Step::Compose, "edit the draft")?;
        Ok(&mut self.draft)
    }

    /// Redaction settings for this session.
    #[must_use]
    pub const fn settings(&self) -> &RedactionSettings {
        &self.settings
    }

    /// Mutable redaction settings.
    pub const fn settings_mut(&mut self) -> &mut RedactionSettings {
        &mut self.settings
    }

    /// Feedback recorded during the last preview and send.
    #[must_use]
    pub const fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Redacted draft, available in the preview and sent steps.
    #[must_use]
    pub const fn redacted(&self) -> Option<&RedactedDraft> {
        self.redacted.as_ref()
    }

    fn require(&self, step: Step, operation: &'static str) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(Error::InvalidStep {
                operation,
                step: self.step,
            })
        }
    }

    /// Appends images to the draft.
    ///
    /// # Errors
    ///
    /// Returns an error outside the compose step, or if the upload would
    /// exceed the count or size limit. Nothing is added on error.
    pub fn add_images(&mut self, images: Vec<Vec<u8>>) -> Result<()> {
        self.require(Step::Compose, "add images")?;
        validate_uploads(&self.draft.images, &images)?;

        debug!("Adding {} image(s)", images.len());
        self.draft.images.extend(images);
        Ok(())
    }

    /// Removes the image at `index` and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error outside the compose step or if `index` is out of range.
    pub fn remove_image(&mut self, index: usize) -> Result<Vec<u8>> {
        self.require(Step::Compose, "remove images")?;
        if index >= self.draft.images.len() {
            return Err(Error::ImageIndex(index));
        }
        Ok(self.draft.images.remove(index))
    }

    /// Validates the draft, redacts it and moves to the preview step.
    ///
    /// The draft as composed is kept so that [`Session::back`] can restore it.
    ///
    /// # Errors
    ///
    /// Returns an error outside the compose step or if the recipients are
    /// invalid. Remote failures do not error; they fall back to the original
    /// content and are reported in the feedback log.
    pub async fn preview<T, E, C>(&mut self, redactor: &Redactor<T, E, C>) -> Result<&RedactedDraft>
    where
        T: TextClassifier,
        E: TextExtractor,
        C: BoxClassifier,
    {
        self.require(Step::Compose, "preview")?;
        validate_recipients(&self.draft.to, &self.draft.cc)?;

        self.feedback.clear();
        self.original = Some(self.draft.clone());

        let redacted = redactor
            .redact_draft(&self.draft, &self.settings, &self.feedback)
            .await;

        self.step = Step::Preview;
        let redacted = &*self.redacted.insert(redacted);
        Ok(redacted)
    }

    /// Returns to composing with the draft as it was before preview.
    ///
    /// # Errors
    ///
    /// Returns an error outside the preview step.
    pub fn back(&mut self) -> Result<()> {
        self.require(Step::Preview, "go back")?;

        if let Some(original) = self.original.take() {
            self.draft = original;
        }
        self.redacted = None;
        self.step = Step::Compose;
        Ok(())
    }

    /// Builds the outgoing message from the redacted content.
    ///
    /// # Errors
    ///
    /// Returns an error outside the preview step.
    pub fn outgoing(&self) -> Result<OutgoingEmail> {
        self.require(Step::Preview, "send")?;
        let redacted = self.redacted.as_ref().ok_or(Error::InvalidStep {
            operation: "send",
            step: self.step,
        })?;

        Ok(OutgoingEmail::new(&self.draft.to, &self.draft.subject, &redacted.body)
            .with_cc(deduplicate_cc(&self.draft.to, &self.draft.cc))
            .with_images(redacted.images.iter().cloned()))
    }

    /// Sends the redacted message and moves to the sent step.
    ///
    /// The step changes even when every transport fails; the report says
    /// what happened.
    ///
    /// # Errors
    ///
    /// Returns an error outside the preview step.
    pub async fn send<D: Dispatcher>(&mut self, dispatcher: &D) -> Result<DeliveryReport> {
        let email = self.outgoing()?;

        self.feedback.emit("Sending email...");
        let report = dispatcher.deliver(&email).await;
        self.feedback.emit(&report.summary());

        info!("{}", report.summary());
        self.step = Step::Sent;
        Ok(report)
    }

    /// Clears everything and starts a new email with `settings`.
    pub fn new_email(&mut self, settings: RedactionSettings) {
        debug!("Starting new email");
        *self = Self::new(settings);
    }
}
