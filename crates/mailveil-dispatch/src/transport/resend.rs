//! Resend REST transport.

use super::{EmailTransport, non_blank, post_json};
use crate::email::OutgoingEmail;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Sends through `https://api.resend.com/emails`.
#[derive(Debug, Clone)]
pub struct ResendTransport {
    api_key: Option<String>,
    sender: String,
    url: String,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: Vec<String>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ResendAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct ResendAttachment<'a> {
    filename: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

impl ResendTransport {
    /// Creates a transport. A missing or blank key fails every send.
    #[must_use]
    pub fn new(api_key: Option<String>, sender: impl Into<String>) -> Self {
        Self {
            api_key: non_blank(api_key),
            sender: sender.into(),
            url: RESEND_URL.to_string(),
            http_client: Client::new(),
        }
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn payload<'a>(&'a self, email: &'a OutgoingEmail) -> ResendEmail<'a> {
        ResendEmail {
            from: &self.sender,
            to: email.to_addresses(),
            subject: &email.subject,
            text: &email.body_text,
            cc: email.cc_addresses(),
            attachments: email
                .attachments
                .iter()
                .map(|a| ResendAttachment {
                    filename: &a.filename,
                    content: a.base64_content(),
                })
                .collect(),
        }
    }
}

impl EmailTransport for ResendTransport {
    fn name(&self) -> &'static str {
        "Resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredentials(self.name()))?;

        let payload = self.payload(email);
        if payload.to.is_empty() {
            return Err(Error::NoRecipients);
        }

        let body = post_json(&self.http_client, self.name(), &self.url, Some(api_key), &payload).await?;

        let id = serde_json::from_str::<ResendResponse>(&body)
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_default();
        info!("Email sent via Resend (id {id})");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailveil_redact::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let transport = ResendTransport::new(Some("re_key".to_string()), "noreply@example.com");
        let email = OutgoingEmail::new("a@x.io", "Hello", "Body [NAME]")
            .with_cc("A@x.io")
            .with_images([b"raw".to_vec()]);

        let value = serde_json::to_value(transport.payload(&email)).unwrap();
        assert_eq!(
            value,
            json!({
                "from": "noreply@example.com",
                "to": ["a@x.io"],
                "subject": "Hello",
                "text": "Body [NAME]",
                "attachments": [{"filename": "image_1.png", "content": "cmF3"}]
            })
        );
    }

    #[test]
    fn test_payload_with_cc() {
        let transport = ResendTransport::new(Some("k".to_string()), "s@x.io");
        let email = OutgoingEmail::new("a@x.io", "s", "b").with_cc("b@x.io");
        let value = serde_json::to_value(transport.payload(&email)).unwrap();
        assert_eq!(value["cc"], json!(["b@x.io"]));
        assert!(value.get("attachments").is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let transport = ResendTransport::new(Some(String::new()), "s@x.io");
        let err = transport
            .send(&OutgoingEmail::new("a@x.io", "s", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredentials("Resend")));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let transport = ResendTransport::new(Some("k".to_string()), "s@x.io");
        let err = transport.send(&OutgoingEmail::new(" ; ", "s", "b")).await.unwrap_err();
        assert!(matches!(err, Error::NoRecipients));
    }
}
