//! Notification delivery: one attempt per subscriber per message.
//!
//! [`NotificationSender`] renders the email for a message and hands it to
//! a [`Mailer`]. Every attempt is bounded by a timeout, and every failure
//! is folded into a [`DeliveryOutcome`] instead of being returned as an
//! error. Nothing here retries.

pub mod memory;
pub mod resend;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{DeliveryOutcome, Subscriber};
use crate::error::DeliveryError;

pub use memory::MemoryMailer;
pub use resend::ResendMailer;

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Outbound notification transport.
#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    /// Performs one transmission attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the transport failed or rejected
    /// the email.
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError>;
}

/// Subject line for a notification on `topic`.
#[must_use]
pub fn subject_for(topic: &str) -> String {
    format!("New update on {topic}")
}

/// HTML body for a notification carrying `payload`.
///
/// The payload is embedded verbatim.
#[must_use]
pub fn body_for(payload: &str) -> String {
    format!("<p>{payload}</p>")
}

/// Builds notifications and performs a single, time-bounded delivery
/// attempt through a [`Mailer`].
#[derive(Debug, Clone)]
pub struct NotificationSender {
    mailer: Arc<dyn Mailer>,
    from: String,
    timeout: Duration,
}

impl NotificationSender {
    /// Creates a sender using `from` as the sender address.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>, timeout: Duration) -> Self {
        Self {
            mailer,
            from: from.into(),
            timeout,
        }
    }

    /// Renders the email for `subscriber` on `topic`.
    #[must_use]
    pub fn render(&self, subscriber: &Subscriber, topic: &str, payload: &str) -> OutboundEmail {
        OutboundEmail {
            from: self.from.clone(),
            to: subscriber.address.clone(),
            subject: subject_for(topic),
            html: body_for(payload),
        }
    }

    /// Delivers `payload` on `topic` to `subscriber`.
    ///
    /// Never fails: transport errors and timeouts come back as a failed
    /// [`DeliveryOutcome`].
    pub async fn send(
        &self,
        subscriber: &Subscriber,
        topic: &str,
        payload: &str,
    ) -> DeliveryOutcome {
        let email = self.render(subscriber, topic, payload);
        let result = match tokio::time::timeout(self.timeout, self.mailer.send(&email)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(to = %email.to, topic, "notification sent");
                DeliveryOutcome::delivered(&subscriber.address)
            }
            Err(err) => {
                tracing::warn!(to = %email.to, topic, error = %err, "notification failed");
                DeliveryOutcome::failed(&subscriber.address, &err)
            }
        }
    }
}
