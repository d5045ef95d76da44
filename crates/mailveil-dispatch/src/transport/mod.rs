//! Email transports.

mod mailpit;
mod resend;
mod sendgrid;

pub use mailpit::{DEFAULT_MAILPIT_URL, MailpitTransport};
pub use resend::ResendTransport;
pub use sendgrid::SendGridTransport;

use crate::email::OutgoingEmail;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Timeout applied to every provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters of a rejection body kept in [`Error::Rejected`].
const ERROR_BODY_LIMIT: usize = 200;

/// Something that can deliver an [`OutgoingEmail`].
pub trait EmailTransport: Send + Sync {
    /// Short provider name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Sends the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the message.
    fn send(&self, email: &OutgoingEmail) -> impl Future<Output = Result<()>> + Send;
}

/// Posts a JSON body and returns the response text on success.
pub(crate) async fn post_json<T: Serialize + Sync>(
    http_client: &Client,
    provider: &'static str,
    url: &str,
    api_key: Option<&str>,
    body: &T,
) -> Result<String> {
    debug!("{provider}: POST {url}");

    let mut request = http_client.post(url).timeout(REQUEST_TIMEOUT).json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(Error::Rejected {
            provider,
            status: status.as_u16(),
            body: text.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }

    Ok(text)
}

/// Filters blank keys so a set-but-empty variable counts as missing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
