//! Domain events reflecting relay activity.
//!
//! Registry mutations, accepted publishes and dispatch results are emitted
//! as [`RelayEvent`]s through the [`super::EventBus`] and streamed to
//! WebSocket observers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DeliveryOutcome, DispatchReport, DispatchResolution};

/// Domain event emitted by the relay.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// A new subscriber was registered.
    SubscriberRegistered {
        /// Subscriber address.
        address: String,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A subscriber expressed interest in a topic.
    TopicSubscribed {
        /// Subscriber address.
        address: String,
        /// Topic name.
        topic: String,
        /// `false` when the subscriber already had the topic.
        newly_added: bool,
        /// Subscription timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A message was accepted by the broker for dispatch.
    MessagePublished {
        /// Target topic.
        topic: String,
        /// Acceptance timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A single notification attempt finished.
    DeliveryAttempted {
        /// Topic of the dispatched message.
        topic: String,
        /// Attempt outcome.
        outcome: DeliveryOutcome,
    },

    /// All jobs of a dispatch batch reported.
    DispatchCompleted {
        /// Topic of the dispatched message.
        topic: String,
        /// Subscriber resolution result.
        resolution: DispatchResolution,
        /// Successful deliveries.
        delivered: usize,
        /// Failed deliveries.
        failed: usize,
        /// Completion timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl RelayEvent {
    /// Builds a [`RelayEvent::DispatchCompleted`] from a finished report.
    #[must_use]
    pub fn dispatch_completed(report: &DispatchReport) -> Self {
        Self::DispatchCompleted {
            topic: report.topic.clone(),
            resolution: report.resolution.clone(),
            delivered: report.delivered(),
            failed: report.failed(),
            timestamp: report.finished_at,
        }
    }

    /// Returns the topic this event concerns, if any.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        match self {
            Self::SubscriberRegistered { .. } => None,
            Self::TopicSubscribed { topic, .. }
            | Self::MessagePublished { topic, .. }
            | Self::DeliveryAttempted { topic, .. }
            | Self::DispatchCompleted { topic, .. } => Some(topic),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::SubscriberRegistered { .. } => "subscriber_registered",
            Self::TopicSubscribed { .. } => "topic_subscribed",
            Self::MessagePublished { .. } => "message_published",
            Self::DeliveryAttempted { .. } => "delivery_attempted",
            Self::DispatchCompleted { .. } => "dispatch_completed",
        }
    }
}
