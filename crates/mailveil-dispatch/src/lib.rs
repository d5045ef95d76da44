//! # mailveil-dispatch
//!
//! Outgoing email delivery for `mailveil`.
//!
//! ## Features
//!
//! - **Providers**: Resend and `SendGrid` REST APIs for production, Mailpit for
//!   local testing
//! - **Fallback**: Primary then secondary, sequentially
//! - **Recipients**: A cc field that repeats the whole to field is dropped
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailveil_dispatch::{FallbackChain, OutgoingEmail, ResendTransport, SendGridTransport};
//!
//! let chain = FallbackChain::new(
//!     ResendTransport::new(resend_key, "noreply@example.com"),
//!     SendGridTransport::new(sendgrid_key, "noreply@example.com"),
//! );
//!
//! let email = OutgoingEmail::new("bob@example.com", "Report", redacted_body)
//!     .with_images(redacted_images);
//!
//! let report = chain.deliver(&email).await;
//! println!("{}", report.summary());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod email;
mod error;
mod fallback;
mod transport;

pub use email::{Attachment, OutgoingEmail, deduplicate_cc, split_addresses};
pub use error::{Error, Result};
pub use fallback::{DeliveryReport, FallbackChain, deliver_with};
pub use transport::{
    DEFAULT_MAILPIT_URL, EmailTransport, MailpitTransport, REQUEST_TIMEOUT, ResendTransport,
    SendGridTransport,
};
