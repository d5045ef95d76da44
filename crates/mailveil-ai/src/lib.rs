//! # mailveil-ai
//!
//! Language-model client for `mailveil`.
//!
//! ## Features
//!
//! - **Text redaction**: Rewrites an email body with enabled PII categories
//!   replaced by their placeholders
//! - **Box classification**: Labels OCR word boxes with a PII category in one
//!   batched request, with local filtering of the reply
//! - **Provider**: Any OpenAI-compatible chat-completions endpoint (Groq by default)
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailveil_ai::{AiClient, find_sensitive_boxes};
//! use mailveil_redact::{RedactionSettings, TracingFeedback};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AiClient::new(std::env::var("GROQ_API_KEY").ok());
//!     let settings = RedactionSettings::default();
//!
//!     let redacted = client
//!         .redact_text("Call Jane at 555-0100", &settings, &TracingFeedback)
//!         .await?;
//!     println!("{}", redacted.text);
//!
//!     let map = client.classify_boxes(&boxes, &settings, &TracingFeedback).await?;
//!     let sensitive = find_sensitive_boxes(&boxes, &map, &settings);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod classify;
mod client;
mod error;
pub mod prompt;
mod text;

pub use classify::{find_sensitive_boxes, parse_sensitivity_response, strip_code_fences};
pub use client::{
    AiClient, Completion, DEFAULT_ENDPOINT, DEFAULT_MODEL, REQUEST_TIMEOUT, parse_completion,
};
pub use error::{Error, Result};
pub use text::TextRedaction;
