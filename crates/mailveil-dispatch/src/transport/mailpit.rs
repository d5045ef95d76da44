//! Mailpit transport for local testing.
//!
//! Mailpit captures every message in a local inbox and never relays it.
//! Messages are submitted through its HTTP send API.

use super::{EmailTransport, post_json};
use crate::email::OutgoingEmail;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default Mailpit web/API address.
pub const DEFAULT_MAILPIT_URL: &str = "http://localhost:8025";

const SEND_PATH: &str = "/api/v1/send";

/// Sends to a local Mailpit instance.
#[derive(Debug, Clone)]
pub struct MailpitTransport {
    base_url: String,
    sender: String,
    http_client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailpitMessage<'a> {
    from: MailpitAddress,
    to: Vec<MailpitAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<MailpitAddress>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<MailpitAttachment<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailpitAddress {
    email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailpitAttachment<'a> {
    content: String,
    filename: &'a str,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MailpitResponse {
    #[serde(rename = "ID")]
    id: Option<String>,
}

fn addresses(list: Vec<String>) -> Vec<MailpitAddress> {
    list.into_iter().map(|email| MailpitAddress { email }).collect()
}

impl MailpitTransport {
    /// Creates a transport for the Mailpit instance at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sender: sender.into(),
            http_client: Client::new(),
        }
    }

    /// Full send endpoint.
    #[must_use]
    pub fn send_url(&self) -> String {
        format!("{}{SEND_PATH}", self.base_url)
    }

    fn payload<'a>(&'a self, email: &'a OutgoingEmail) -> MailpitMessage<'a> {
        MailpitMessage {
            from: MailpitAddress {
                email: self.sender.clone(),
            },
            to: addresses(email.to_addresses()),
            cc: addresses(email.cc_addresses()),
            subject: &email.subject,
            text: &email.body_text,
            attachments: email
                .attachments
                .iter()
                .map(|a| MailpitAttachment {
                    content: a.base64_content(),
                    filename: &a.filename,
                    content_type: &a.content_type,
                })
                .collect(),
        }
    }
}

impl Default for MailpitTransport {
    fn default() -> Self {
        Self::new(DEFAULT_MAILPIT_URL, "mailveil@localhost")
    }
}

impl EmailTransport for MailpitTransport {
    fn name(&self) -> &'static str {
        "Mailpit"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let payload = self.payload(email);
        if payload.to.is_empty() {
            return Err(Error::NoRecipients);
        }

        let body = post_json(&self.http_client, self.name(), &self.send_url(), None, &payload).await?;

        let id = serde_json::from_str::<MailpitResponse>(&body)
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_default();
        info!("Email captured by Mailpit (id {id})");
        Ok(())
    }
}
