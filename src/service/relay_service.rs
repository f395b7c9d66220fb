//! Relay service: the synchronous request path.
//!
//! Registration and subscription go straight to the registry; publishing
//! hands the message to the broker and returns as soon as the broker has
//! accepted it. Delivery happens later, on the dispatch path.

use std::sync::Arc;

use chrono::Utc;

use crate::broker::Broker;
use crate::domain::{EventBus, RelayEvent, Subscriber, SubscriberRegistry};
use crate::error::RelayError;

/// Orchestration layer behind the HTTP handlers.
///
/// Owns injected references to the [`SubscriberRegistry`], the
/// [`Broker`] and the [`EventBus`]. Every mutation follows the pattern:
/// call the collaborator -> emit an event -> return the result.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<dyn SubscriberRegistry>,
    broker: Arc<dyn Broker>,
    event_bus: EventBus,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        broker: Arc<dyn Broker>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            broker,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the broker transport name.
    #[must_use]
    pub fn broker_name(&self) -> &'static str {
        self.broker.name()
    }

    /// Registers a new subscriber with no topics.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DuplicateSubscriber`] if the address exists,
    /// or [`RelayError::Persistence`] on storage failure.
    pub async fn register(&self, address: &str) -> Result<Subscriber, RelayError> {
        let subscriber = self.registry.register(address).await?;

        let _ = self.event_bus.publish(RelayEvent::SubscriberRegistered {
            address: subscriber.address.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(address, "subscriber registered");
        Ok(subscriber)
    }

    /// Subscribes `address` to `topic`. Idempotent.
    ///
    /// Returns `true` if the topic was newly added.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::SubscriberNotFound`] if the address is not
    /// registered, or [`RelayError::Persistence`] on storage failure.
    pub async fn subscribe(&self, address: &str, topic: &str) -> Result<bool, RelayError> {
        let newly_added = self.registry.add_topic(address, topic).await?;

        let _ = self.event_bus.publish(RelayEvent::TopicSubscribed {
            address: address.to_string(),
            topic: topic.to_string(),
            newly_added,
            timestamp: Utc::now(),
        });

        tracing::info!(address, topic, newly_added, "topic subscribed");
        Ok(newly_added)
    }

    /// Publishes `message` on `topic` through the broker.
    ///
    /// Returns once the broker accepted the message. The caller learns
    /// nothing about individual deliveries.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::TransportUnavailable`] if the broker rejected
    /// the message.
    pub async fn publish(&self, topic: &str, message: &str) -> Result<(), RelayError> {
        self.broker.publish(topic, message).await?;

        let _ = self.event_bus.publish(RelayEvent::MessagePublished {
            topic: topic.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(topic, broker = self.broker.name(), "message published");
        Ok(())
    }

    /// Looks up a subscriber by address.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::SubscriberNotFound`] if the address is not
    /// registered, or [`RelayError::Persistence`] on storage failure.
    pub async fn subscriber(&self, address: &str) -> Result<Subscriber, RelayError> {
        self.registry
            .get(address)
            .await?
            .ok_or_else(|| RelayError::SubscriberNotFound(address.to_string()))
    }
}
