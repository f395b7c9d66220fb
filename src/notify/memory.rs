//! In-memory outbox mailer.
//!
//! Used when no mail provider is configured (every email is logged and
//! kept in memory) and as the mailer in tests. Individual recipients can
//! be marked as failing to exercise partial-failure paths.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Mailer, OutboundEmail};
use crate::error::DeliveryError;

/// Mailer that records emails instead of sending them.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryMailer {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future send to `address` fail with a transport error.
    pub async fn fail_for(&self, address: &str) {
        self.failing.lock().await.insert(address.to_string());
    }

    /// Returns a copy of every email accepted so far, in send order.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    /// Returns the emails accepted for `address`.
    pub async fn sent_to(&self, address: &str) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|email| email.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        if self.failing.lock().await.contains(&email.to) {
            return Err(DeliveryError::Transport(format!(
                "recipient {} marked as failing",
                email.to
            )));
        }
        tracing::info!(to = %email.to, subject = %email.subject, "outbox: email recorded");
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            from: "relay@x.com".to_string(),
            to: to.to_string(),
            subject: "New update on weather".to_string(),
            html: "<p>rain</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn failing_recipient_is_not_recorded() {
        let mailer = MemoryMailer::new();
        mailer.fail_for("b@x.com").await;

        assert!(mailer.send(&email("a@x.com")).await.is_ok());
        assert!(mailer.send(&email("b@x.com")).await.is_err());

        assert_eq!(mailer.sent().await.len(), 1);
        assert!(mailer.sent_to("b@x.com").await.is_empty());
    }
}
