//! # mailveil-core
//!
//! Redaction pipeline, draft session and configuration for `mailveil`.
//!
//! ## Features
//!
//! - **Pipeline**: OCR, classification, merging and compositing per image,
//!   falling back to the original on any failure
//! - **Session**: Compose, preview and send with validation and restore
//! - **Delivery**: Mailpit locally, Resend with `SendGrid` fallback in production
//! - **Configuration**: Settings file under the platform config directory with
//!   environment overrides
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailveil_core::{Config, Delivery, RemoteRedactor, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load().await?;
//!     let redactor = RemoteRedactor::from_config(&config);
//!     let delivery = Delivery::from_config(&config);
//!
//!     let mut session = Session::new(config.redaction.clone());
//!     let draft = session.draft_mut()?;
//!     draft.to = "bob@example.com".into();
//!     draft.body = "Call Jane at 555-0100".into();
//!
//!     let preview = session.preview(&redactor).await?;
//!     println!("{}", preview.body);
//!
//!     let report = session.send(&delivery).await?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod delivery;
mod error;
mod pipeline;
mod redactor;
mod session;
pub mod validation;

pub use config::Config;
pub use delivery::{Delivery, Dispatcher};
pub use error::{Error, Result};
pub use pipeline::{
    BoxClassifier, ImagePipeline, Stage, StageError, StageResult, TextClassifier, TextExtractor,
};
pub use redactor::{Draft, RedactedDraft, Redactor, RemoteRedactor};
pub use session::{Session, Step};
pub use validation::{MAX_IMAGES, MAX_TOTAL_BYTES, ValidationError};
