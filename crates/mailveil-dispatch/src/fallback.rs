//! Primary/secondary delivery.

use crate::email::OutgoingEmail;
use crate::error::Error;
use crate::transport::EmailTransport;
use tracing::{error, info, warn};

/// Outcome of a delivery attempt across one or more transports.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Name of the transport that accepted the message, if any.
    pub delivered_by: Option<&'static str>,
    /// Failures in attempt order.
    pub failures: Vec<(&'static str, Error)>,
}

impl DeliveryReport {
    /// Checks whether some transport accepted the message.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.delivered_by.is_some()
    }

    /// One-line summary for logs and feedback.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.delivered_by {
            Some(name) if self.failures.is_empty() => format!("Email sent via {name}"),
            Some(name) => format!(
                "Email sent via {name} after {} failed attempt(s)",
                self.failures.len()
            ),
            None => {
                let reasons = self
                    .failures
                    .iter()
                    .map(|(name, err)| format!("{name}: {err}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("Email not sent ({reasons})")
            }
        }
    }
}

/// Delivers through one transport, recording the outcome.
pub async fn deliver_with<T: EmailTransport>(transport: &T, email: &OutgoingEmail) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    match transport.send(email).await {
        Ok(()) => report.delivered_by = Some(transport.name()),
        Err(err) => {
            error!("{} failed: {err}", transport.name());
            report.failures.push((transport.name(), err));
        }
    }
    report
}

/// Tries `primary`, then `secondary` only if the primary failed.
///
/// Attempts are sequential; the secondary is never contacted while the
/// primary is in flight.
#[derive(Debug, Clone)]
pub struct FallbackChain<P, S> {
    primary: P,
    secondary: S,
}

impl<P: EmailTransport, S: EmailTransport> FallbackChain<P, S> {
    /// Creates a chain.
    #[must_use]
    pub const fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    /// Delivers the message, falling back once.
    pub async fn deliver(&self, email: &OutgoingEmail) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        match self.primary.send(email).await {
            Ok(()) => {
                report.delivered_by = Some(self.primary.name());
                return report;
            }
            Err(err) => {
                warn!(
                    "{} failed ({err}), trying {}",
                    self.primary.name(),
                    self.secondary.name()
                );
                report.failures.push((self.primary.name(), err));
            }
        }

        match self.secondary.send(email).await {
            Ok(()) => {
                info!("Delivered via fallback {}", self.secondary.name());
                report.delivered_by = Some(self.secondary.name());
            }
            Err(err) => {
                error!(
                    "Both {} and {} failed, email not sent",
                    self.primary.name(),
                    self.secondary.name()
                );
                report.failures.push((self.secondary.name(), err));
            }
        }

        report
    }
}
