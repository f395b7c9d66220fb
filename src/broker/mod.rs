//! Broker transport: moves published messages to the dispatch core.
//!
//! A [`Broker`] accepts `publish(topic, payload)` calls from the request
//! path. Every implementation is constructed together with an
//! `mpsc::Receiver<Message>` carrying the inbound side of the transport;
//! the [`crate::service::BrokerRelay`] drains that receiver. Interest in
//! all topics is established when the broker is constructed, before any
//! publish can happen, so no message is lost to a late transport-level
//! subscription.

pub mod memory;
pub mod nats;

use std::fmt;

use async_trait::async_trait;

use crate::error::RelayError;

pub use memory::InMemoryBroker;
pub use nats::NatsBroker;

/// Outbound side of the pub/sub transport.
#[async_trait]
pub trait Broker: Send + Sync + fmt::Debug {
    /// Hands `payload` to the transport for delivery on `topic`.
    ///
    /// Returns once the transport accepted the message; delivery to
    /// subscribers happens asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::TransportUnavailable`] if the transport
    /// cannot accept the message.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), RelayError>;

    /// Short transport name for logs and health output.
    fn name(&self) -> &'static str;
}
