//! # mailveil-ocr
//!
//! OCR client for `mailveil`, backed by the OCR.space REST API.
//!
//! Returns one [`TextBox`](mailveil_redact::TextBox) per recognized word with
//! pixel coordinates. Order of the returned boxes is not significant.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailveil_ocr::OcrClient;
//! use mailveil_redact::TracingFeedback;
//!
//! let client = OcrClient::new(std::env::var("OCRSPACE_API_KEY").ok());
//! let boxes = client.extract_text_with_boxes(&png_bytes, &TracingFeedback).await?;
//! for b in &boxes {
//!     println!("{} at ({}, {})", b.text, b.x, b.y);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;

pub use client::{DEFAULT_ENDPOINT, OcrClient, OcrOutcome, REQUEST_TIMEOUT, parse_ocr_response};
pub use error::{Error, Result};
