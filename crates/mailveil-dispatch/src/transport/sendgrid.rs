//! `SendGrid` v3 transport.

use super::{EmailTransport, non_blank, post_json};
use crate::email::OutgoingEmail;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Sends through the `SendGrid` v3 mail send API.
///
/// The sender must be verified in the `SendGrid` account.
#[derive(Debug, Clone)]
pub struct SendGridTransport {
    api_key: Option<String>,
    sender: String,
    url: String,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct SendGridMail<'a> {
    personalizations: [Personalization; 1],
    from: Address,
    subject: &'a str,
    content: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SendGridAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct Address {
    email: String,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridAttachment<'a> {
    content: String,
    filename: &'a str,
    #[serde(rename = "type")]
    content_type: &'a str,
    disposition: &'static str,
}

fn addresses(list: Vec<String>) -> Vec<Address> {
    list.into_iter().map(|email| Address { email }).collect()
}

impl SendGridTransport {
    /// Creates a transport. A missing or blank key fails every send.
    #[must_use]
    pub fn new(api_key: Option<String>, sender: impl Into<String>) -> Self {
        Self {
            api_key: non_blank(api_key),
            sender: sender.into(),
            url: SENDGRID_URL.to_string(),
            http_client: Client::new(),
        }
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn payload<'a>(&'a self, email: &'a OutgoingEmail) -> SendGridMail<'a> {
        SendGridMail {
            personalizations: [Personalization {
                to: addresses(email.to_addresses()),
                cc: addresses(email.cc_addresses()),
            }],
            from: Address {
                email: self.sender.clone(),
            },
            subject: &email.subject,
            content: [Content {
                kind: "text/plain",
                value: &email.body_text,
            }],
            attachments: email
                .attachments
                .iter()
                .map(|a| SendGridAttachment {
                    content: a.base64_content(),
                    filename: &a.filename,
                    content_type: &a.content_type,
                    disposition: "attachment",
                })
                .collect(),
        }
    }
}

impl EmailTransport for SendGridTransport {
    fn name(&self) -> &'static str {
        "SendGrid"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredentials(self.name()))?;

        let payload = self.payload(email);
        if payload.personalizations[0].to.is_empty() {
            return Err(Error::NoRecipients);
        }

        // 202 Accepted with an empty body
        post_json(&self.http_client, self.name(), &self.url, Some(api_key), &payload).await?;

        info!("Email sent via SendGrid to {}", email.to);
        Ok(())
    }
}
