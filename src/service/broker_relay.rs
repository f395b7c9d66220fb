//! Broker relay: drains inbound broker messages into the dispatcher.
//!
//! The relay owns the receiving end of the broker's inbound channel. For
//! every message it spawns exactly one dispatch task and goes back to
//! reading, so a slow or failing dispatch never holds up the transport.
//! An optional in-flight limit stops reading while that many dispatches
//! are running; the inbound channel then fills up and publishers feel the
//! broker's backpressure. Dispatch tasks are tracked so shutdown can wait
//! for the batches already in flight.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::DispatchCoordinator;
use crate::domain::Message;

/// Bridges the broker transport to the [`DispatchCoordinator`].
#[derive(Debug)]
pub struct BrokerRelay {
    coordinator: Arc<DispatchCoordinator>,
    in_flight: TaskTracker,
    slots: Option<Arc<Semaphore>>,
}

impl BrokerRelay {
    /// Creates a relay feeding `coordinator` with no in-flight limit.
    #[must_use]
    pub fn new(coordinator: Arc<DispatchCoordinator>) -> Self {
        Self {
            coordinator,
            in_flight: TaskTracker::new(),
            slots: None,
        }
    }

    /// Caps the number of dispatches running at once.
    ///
    /// `0` leaves it unbounded.
    #[must_use]
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.slots = (limit > 0).then(|| Arc::new(Semaphore::new(limit)));
        self
    }

    /// Reads `inbound` until it closes or `shutdown` fires.
    ///
    /// On shutdown the channel is closed to new messages, messages already
    /// buffered in it are still dispatched, and the relay then waits for
    /// every in-flight dispatch to finish.
    ///
    /// Returns the number of messages handed to the dispatcher.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<Message>,
        shutdown: CancellationToken,
    ) -> u64 {
        let mut relayed: u64 = 0;
        tracing::info!("broker relay started");

        loop {
            let slot = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                slot = self.acquire_slot() => slot,
            };
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                next = inbound.recv() => {
                    let Some(message) = next else { break };
                    relayed = relayed.saturating_add(1);
                    self.spawn_dispatch(message, slot);
                }
            }
        }

        inbound.close();
        let mut buffered: u64 = 0;
        while let Some(message) = inbound.recv().await {
            let slot = self.acquire_slot().await;
            buffered = buffered.saturating_add(1);
            self.spawn_dispatch(message, slot);
        }
        relayed = relayed.saturating_add(buffered);

        self.in_flight.close();
        tracing::info!(
            in_flight = self.in_flight.len(),
            buffered,
            "broker relay draining"
        );
        self.in_flight.wait().await;
        tracing::info!(relayed, "broker relay stopped");
        relayed
    }

    async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        match &self.slots {
            Some(slots) => Arc::clone(slots).acquire_owned().await.ok(),
            None => None,
        }
    }

    fn spawn_dispatch(&self, message: Message, slot: Option<OwnedSemaphorePermit>) {
        tracing::debug!(topic = %message.topic, "message received from broker");
        let coordinator = Arc::clone(&self.coordinator);
        self.in_flight.spawn(async move {
            let _slot = slot;
            let _report = coordinator.dispatch(message).await;
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::broker::{Broker, InMemoryBroker};
    use crate::domain::{EventBus, InMemoryRegistry, SubscriberRegistry};
    use crate::notify::{Mailer, MemoryMailer, NotificationSender};

    async fn setup(mailer: Arc<MemoryMailer>) -> Arc<DispatchCoordinator> {
        let registry = Arc::new(InMemoryRegistry::new());
        let _ = registry.register("a@x.com").await;
        let _ = registry.add_topic("a@x.com", "weather").await;
        let sender = NotificationSender::new(
            mailer as Arc<dyn Mailer>,
            "relay@x.com",
            Duration::from_secs(1),
        );
        Arc::new(DispatchCoordinator::new(registry, sender, EventBus::new(100)))
    }

    #[tokio::test]
    async fn every_message_is_dispatched_once() {
        let mailer = Arc::new(MemoryMailer::new());
        let coordinator = setup(Arc::clone(&mailer)).await;
        let (broker, inbound) = InMemoryBroker::new(16);

        for i in 0..5 {
            let Ok(()) = broker.publish("weather", &format!("update {i}")).await else {
                panic!("publish failed");
            };
        }
        let _ = broker.publish("news", "ignored").await;
        drop(broker);

        let relayed = BrokerRelay::new(coordinator)
            .run(inbound, CancellationToken::new())
            .await;

        assert_eq!(relayed, 6);
        assert_eq!(mailer.sent_to("a@x.com").await.len(), 5);
    }

    #[tokio::test]
    async fn failed_dispatch_does_not_stop_the_relay() {
        let mailer = Arc::new(MemoryMailer::new());
        mailer.fail_for("a@x.com").await;
        let coordinator = setup(Arc::clone(&mailer)).await;
        let (broker, inbound) = InMemoryBroker::new(16);

        let _ = broker.publish("weather", "first").await;
        let _ = broker.publish("weather", "second").await;
        drop(broker);

        let relayed = BrokerRelay::new(coordinator)
            .run(inbound, CancellationToken::new())
            .await;
        assert_eq!(relayed, 2);
    }

    #[tokio::test]
    async fn shutdown_with_empty_channel_stops_immediately() {
        let mailer = Arc::new(MemoryMailer::new());
        let coordinator = setup(mailer).await;
        let (_broker, inbound) = InMemoryBroker::new(16);
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(BrokerRelay::new(coordinator).run(inbound, shutdown.clone()));
        shutdown.cancel();

        let Ok(relayed) = handle.await else {
            panic!("relay task failed");
        };
        assert_eq!(relayed, 0);
    }

    #[tokio::test]
    async fn buffered_messages_are_dispatched_on_shutdown() {
        let mailer = Arc::new(MemoryMailer::new());
        let coordinator = setup(Arc::clone(&mailer)).await;
        let (broker, inbound) = InMemoryBroker::new(16);

        for i in 0..3 {
            let Ok(()) = broker.publish("weather", &format!("late {i}")).await else {
                panic!("publish failed");
            };
        }
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let relayed = BrokerRelay::new(coordinator).run(inbound, shutdown).await;

        assert_eq!(relayed, 3);
        assert_eq!(mailer.sent_to("a@x.com").await.len(), 3);
        // The channel is closed once the relay has stopped.
        assert!(broker.publish("weather", "too late").await.is_err());
    }

    #[tokio::test]
    async fn in_flight_limit_still_dispatches_everything() {
        let mailer = Arc::new(MemoryMailer::new());
        let coordinator = setup(Arc::clone(&mailer)).await;
        let (broker, inbound) = InMemoryBroker::new(16);

        for i in 0..10 {
            let _ = broker.publish("weather", &format!("update {i}")).await;
        }
        drop(broker);

        let relayed = BrokerRelay::new(coordinator)
            .with_max_in_flight(2)
            .run(inbound, CancellationToken::new())
            .await;

        assert_eq!(relayed, 10);
        assert_eq!(mailer.sent_to("a@x.com").await.len(), 10);
    }
}
