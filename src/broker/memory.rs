//! In-process broker backed by a bounded `tokio::sync::mpsc` channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Broker;
use crate::domain::Message;
use crate::error::RelayError;

/// Single-process broker.
///
/// Publishing pushes straight into the relay's inbound channel. When the
/// channel is full, `publish` waits for capacity instead of dropping.
#[derive(Debug, Clone)]
pub struct InMemoryBroker {
    sender: mpsc::Sender<Message>,
}

impl InMemoryBroker {
    /// Creates a broker and the inbound receiver the relay should drain.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), RelayError> {
        self.sender
            .send(Message::new(topic, payload))
            .await
            .map_err(|_| RelayError::TransportUnavailable("in-process broker closed".to_string()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
