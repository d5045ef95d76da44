//! # mailveil-redact
//!
//! Deterministic redaction primitives for `mailveil`.
//!
//! ## Features
//!
//! - **Categories**: The closed set of PII categories with per-category
//!   enablement and placeholders ([`RedactionSettings`])
//! - **Text boxes**: OCR word boxes and the classifier's [`SensitivityMap`]
//! - **Geometry**: Line merging and same-category merging of boxes
//! - **Compositing**: Opaque labeled rectangles drawn over a copy of the image
//! - **Feedback**: Observer interface for human-readable progress events
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailveil_redact::{
//!     LabelFont, RedactionCategory, RedactionSettings, TextBox, merge_same_category,
//!     redact_image_bytes,
//! };
//!
//! let settings = RedactionSettings::default();
//! let boxes = vec![
//!     TextBox::new("555", 10.0, 10.0, 30.0, 12.0).with_category(RedactionCategory::Phone),
//!     TextBox::new("0100", 42.0, 10.0, 40.0, 12.0).with_category(RedactionCategory::Phone),
//! ];
//!
//! let merged = merge_same_category(boxes);
//! let font = LabelFont::load(None);
//! let redacted = redact_image_bytes(&png_bytes, &merged, &settings, &font)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod category;
mod composite;
mod error;
mod feedback;
mod merge;
mod text_box;

pub use category::{CategorySetting, RedactionCategory, RedactionSettings};
pub use composite::{
    LABEL_MIN_WIDTH, LabelFont, PADDING, PaddedRect, composite, redact_image_bytes,
};
pub use error::{Error, ErrorKind, Result};
pub use feedback::{FeedbackEvent, FeedbackLog, FeedbackSink, NoFeedback, TracingFeedback};
pub use merge::{
    LINE_MERGE_DISTANCE, max_gap, merge_adjacent_boxes, merge_group, merge_same_category,
};
pub use text_box::{SensitivityMap, TextBox};
