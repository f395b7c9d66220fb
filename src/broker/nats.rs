//! NATS broker transport.
//!
//! All relay traffic uses a single subject, `{prefix}.messages`, carrying
//! a JSON envelope `{"topic": ..., "message": ...}`. Topics are opaque
//! strings and may contain characters NATS forbids in subjects, so they
//! travel in the payload instead of the subject.
//!
//! The subscription is created inside [`NatsBroker::connect`], before the
//! broker is handed to the request path.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::Broker;
use crate::domain::Message;
use crate::error::RelayError;

/// Wire envelope for one published message.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    topic: String,
    message: String,
}

/// Broker that publishes to and consumes from a NATS server.
#[derive(Debug, Clone)]
pub struct NatsBroker {
    client: async_nats::Client,
    subject: String,
}

impl NatsBroker {
    /// Connects to `url`, subscribes to the relay subject, and spawns the
    /// task forwarding inbound messages to the returned receiver.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::TransportUnavailable`] if the connection or
    /// the subscription fails.
    pub async fn connect(
        url: &str,
        prefix: &str,
        capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<Message>), RelayError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| RelayError::TransportUnavailable(format!("nats connect {url}: {e}")))?;

        let subject = format!("{prefix}.messages");
        let subscription = client
            .subscribe(subject.clone())
            .await
            .map_err(|e| RelayError::TransportUnavailable(format!("nats subscribe: {e}")))?;
        tracing::info!(%url, %subject, "nats broker connected");

        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(forward(subscription, tx));

        Ok((Self { client, subject }, rx))
    }
}

/// Decodes inbound NATS messages and pushes them to the relay channel.
///
/// Stops when the subscription ends or the relay dropped its receiver.
async fn forward(mut subscription: async_nats::Subscriber, tx: mpsc::Sender<Message>) {
    while let Some(msg) = subscription.next().await {
        let envelope: Envelope = match serde_json::from_slice(&msg.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    subject = %msg.subject,
                    err = %e,
                    "dropping undecodable broker message"
                );
                continue;
            }
        };
        if tx
            .send(Message::new(envelope.topic, envelope.message))
            .await
            .is_err()
        {
            break;
        }
    }
    tracing::debug!("nats forwarder stopped");
}

#[async_trait]
impl Broker for NatsBroker {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), RelayError> {
        let body = serde_json::to_vec(&Envelope {
            topic: topic.to_string(),
            message: payload.to_string(),
        })
        .map_err(|e| RelayError::Internal(e.to_string()))?;

        self.client
            .publish(self.subject.clone(), body.into())
            .await
            .map_err(|e| RelayError::TransportUnavailable(format!("nats publish: {e}")))?;
        self.client
            .flush()
            .await
            .map_err(|e| RelayError::TransportUnavailable(format!("nats flush: {e}")))
    }

    fn name(&self) -> &'static str {
        "nats"
    }
}
