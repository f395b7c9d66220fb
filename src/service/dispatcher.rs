//! Dispatch coordinator: topic-matching fan-out with failure isolation.
//!
//! For each message the coordinator resolves interested subscribers from
//! the [`SubscriberRegistry`] and spawns one delivery job per subscriber
//! into a [`JoinSet`]. Jobs share no mutable state. A job that fails,
//! times out or panics produces a failed [`DeliveryOutcome`] for its own
//! subscriber and nothing else; the batch always completes with a
//! [`DispatchReport`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::domain::{
    DeliveryOutcome, DispatchReport, DispatchResolution, EventBus, Message, RelayEvent,
    SubscriberRegistry,
};
use crate::error::DeliveryError;
use crate::notify::NotificationSender;

/// Resolves subscribers for a message and fans out notification jobs.
#[derive(Debug)]
pub struct DispatchCoordinator {
    registry: Arc<dyn SubscriberRegistry>,
    sender: Arc<NotificationSender>,
    event_bus: EventBus,
    send_permits: Option<Arc<Semaphore>>,
}

impl DispatchCoordinator {
    /// Creates a coordinator with unbounded send concurrency.
    #[must_use]
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        sender: NotificationSender,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            sender: Arc::new(sender),
            event_bus,
            send_permits: None,
        }
    }

    /// Caps the number of sends in flight across all dispatches.
    ///
    /// `0` leaves concurrency unbounded.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.send_permits = (limit > 0).then(|| Arc::new(Semaphore::new(limit)));
        self
    }

    /// Dispatches `message` to every subscriber of its topic.
    ///
    /// Always completes. A registry failure yields
    /// [`DispatchResolution::LookupFailed`] with no deliveries; it is
    /// reported, not retried.
    pub async fn dispatch(&self, message: Message) -> DispatchReport {
        let started_at = Utc::now();
        let Message { topic, payload, .. } = message;

        let subscribers = match self.registry.find_by_topic(&topic).await {
            Ok(subscribers) => subscribers,
            Err(err) => {
                tracing::error!(
                    %topic,
                    error = %err,
                    "subscriber lookup failed, message not delivered"
                );
                let resolution = DispatchResolution::LookupFailed {
                    reason: err.to_string(),
                };
                return self.finish(topic, resolution, Vec::new(), started_at);
            }
        };

        if subscribers.is_empty() {
            tracing::info!(%topic, "no subscribers for topic");
            return self.finish(topic, DispatchResolution::NoSubscribers, Vec::new(), started_at);
        }

        let matched = subscribers.len();
        tracing::info!(%topic, subscribers = matched, "dispatching message");

        let shared_topic: Arc<str> = Arc::from(topic.as_str());
        let shared_payload: Arc<str> = Arc::from(payload);
        let mut jobs = JoinSet::new();
        let mut job_addresses = HashMap::with_capacity(matched);

        for subscriber in subscribers {
            let sender = Arc::clone(&self.sender);
            let permits = self.send_permits.clone();
            let topic = Arc::clone(&shared_topic);
            let payload = Arc::clone(&shared_payload);
            let address = subscriber.address.clone();

            let handle = jobs.spawn(async move {
                let _permit = match permits {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                sender.send(&subscriber, &topic, &payload).await
            });
            job_addresses.insert(handle.id(), address);
        }

        let mut outcomes = Vec::with_capacity(matched);
        while let Some(joined) = jobs.join_next_with_id().await {
            let outcome = match joined {
                Ok((_, outcome)) => outcome,
                Err(join_err) => {
                    let address = job_addresses.remove(&join_err.id()).unwrap_or_default();
                    let reason = if join_err.is_panic() {
                        "delivery job panicked"
                    } else {
                        "delivery job cancelled"
                    };
                    tracing::warn!(%topic, to = %address, reason, "notification failed");
                    DeliveryOutcome::failed(address, &DeliveryError::Aborted(reason.to_string()))
                }
            };
            self.event_bus.publish(RelayEvent::DeliveryAttempted {
                topic: topic.clone(),
                outcome: outcome.clone(),
            });
            outcomes.push(outcome);
        }

        let resolution = DispatchResolution::Matched {
            subscribers: matched,
        };
        self.finish(topic, resolution, outcomes, started_at)
    }

    fn finish(
        &self,
        topic: String,
        resolution: DispatchResolution,
        outcomes: Vec<DeliveryOutcome>,
        started_at: DateTime<Utc>,
    ) -> DispatchReport {
        let report = DispatchReport {
            topic,
            resolution,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            topic = %report.topic,
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "dispatch completed"
        );
        self.event_bus.publish(RelayEvent::dispatch_completed(&report));
        report
    }
}
