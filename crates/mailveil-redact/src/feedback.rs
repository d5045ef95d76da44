//! Progress feedback.
//!
//! Pipelines report user-facing progress through a [`FeedbackSink`]
//! instead of printing. Sinks take `&self` so one sink can be shared
//! across the text and image pipelines.

use chrono::{DateTime, Local};
use std::sync::{Mutex, PoisonError};

/// Receives progress messages.
pub trait FeedbackSink: Send + Sync {
    /// Records one message.
    fn emit(&self, message: &str);
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for &T {
    fn emit(&self, message: &str) {
        (**self).emit(message);
    }
}

/// A timestamped feedback message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEvent {
    /// When the message was emitted.
    pub at: DateTime<Local>,
    /// Message text.
    pub message: String,
}

impl FeedbackEvent {
    /// Creates an event stamped with the current local time.
    #[must_use]
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            message: message.into(),
        }
    }

    /// Formats the event as `[HH:MM:SS] message`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Collects feedback in memory for later display.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    events: Mutex<Vec<FeedbackEvent>>,
}

impl FeedbackLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the message texts in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    /// Renders the log, one `[HH:MM:SS] message` line per event.
    #[must_use]
    pub fn render(&self) -> String {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(FeedbackEvent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Removes all events.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Checks whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl FeedbackSink for FeedbackLog {
    fn emit(&self, message: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FeedbackEvent::now(message));
    }
}

/// Forwards feedback to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn emit(&self, message: &str) {
        tracing::info!(target: "mailveil::feedback", "{message}");
    }
}

/// Discards feedback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn emit(&self, _message: &str) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_keeps_order() {
        let log = FeedbackLog::new();
        log.emit("first");
        log.emit("second");
        assert_eq!(log.messages(), vec!["first", "second"]);
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_render_format() {
        let event = FeedbackEvent {
            at: Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap(),
            message: "Found 3 text regions".to_string(),
        };
        assert_eq!(event.render(), "[09:05:07] Found 3 text regions");
    }

    #[test]
    fn test_log_render_lines() {
        let log = FeedbackLog::new();
        log.emit("a");
        log.emit("b");
        let rendered = log.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("] a"));
    }

    #[test]
    fn test_sink_through_reference() {
        fn report(sink: &impl FeedbackSink) {
            sink.emit("hello");
        }
        let log = FeedbackLog::new();
        report(&&log);
        NoFeedback.emit("ignored");
        TracingFeedback.emit("logged");
        assert_eq!(log.messages(), vec!["hello"]);
    }
}
