//! Delivery mode selection.

use crate::config::Config;
use mailveil_dispatch::{
    DeliveryReport, FallbackChain, MailpitTransport, OutgoingEmail, ResendTransport,
    SendGridTransport, deliver_with,
};
use std::future::Future;
use tracing::info;

/// Sends a finished message.
pub trait Dispatcher: Send + Sync {
    /// Delivers the message and reports which transport accepted it.
    fn deliver(&self, email: &OutgoingEmail) -> impl Future<Output = DeliveryReport> + Send;
}

/// Configured delivery mode.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Local Mailpit instance.
    Local(MailpitTransport),
    /// Resend with `SendGrid` as fallback.
    Production(FallbackChain<ResendTransport, SendGridTransport>),
}

impl Delivery {
    /// Selects the mode from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.use_production_email {
            info!("Using production email (Resend, SendGrid fallback)");
            Self::Production(FallbackChain::new(
                ResendTransport::new(config.resend_api_key.clone(), &config.sender_resend),
                SendGridTransport::new(config.sendgrid_api_key.clone(), &config.sender_sendgrid),
            ))
        } else {
            info!("Using local Mailpit at {}", config.mailpit_url);
            Self::Local(MailpitTransport::new(&config.mailpit_url, &config.sender_mailpit))
        }
    }

    /// Mode name.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Production(_) => "production",
        }
    }
}

impl Dispatcher for Delivery {
    async fn deliver(&self, email: &OutgoingEmail) -> DeliveryReport {
        match self {
            Self::Local(mailpit) => deliver_with(mailpit, email).await,
            Self::Production(chain) => chain.deliver(email).await,
        }
    }
}
