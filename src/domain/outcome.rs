//! Per-subscriber delivery outcomes and per-message dispatch reports.
//!
//! Both types exist only for observability: they are logged and broadcast
//! on the [`super::EventBus`], never persisted and never returned to the
//! publisher.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DeliveryError;

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The outbound transport accepted the notification.
    Delivered,
    /// The attempt failed; see [`DeliveryOutcome::error`].
    Failed,
}

/// Outcome of delivering one message to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    /// Recipient address.
    pub address: String,
    /// Whether the attempt succeeded.
    pub status: DeliveryStatus,
    /// Failure reason, present only when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the attempt finished.
    pub completed_at: DateTime<Utc>,
}

impl DeliveryOutcome {
    /// Successful delivery to `address`.
    #[must_use]
    pub fn delivered(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: DeliveryStatus::Delivered,
            error: None,
            completed_at: Utc::now(),
        }
    }

    /// Failed delivery to `address`.
    #[must_use]
    pub fn failed(address: impl Into<String>, error: &DeliveryError) -> Self {
        Self {
            address: address.into(),
            status: DeliveryStatus::Failed,
            error: Some(error.to_string()),
            completed_at: Utc::now(),
        }
    }

    /// Returns `true` if the notification was delivered.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}

/// How subscriber resolution went for a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchResolution {
    /// The registry returned at least one subscriber.
    Matched {
        /// Number of subscribers resolved.
        subscribers: usize,
    },
    /// The registry returned no subscribers. Not an error.
    NoSubscribers,
    /// The registry lookup itself failed; nobody was notified.
    LookupFailed {
        /// Registry error message.
        reason: String,
    },
}

/// Summary of one dispatch batch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// Topic of the dispatched message.
    pub topic: String,
    /// Subscriber resolution result.
    pub resolution: DispatchResolution,
    /// One outcome per resolved subscriber, in completion order.
    pub outcomes: Vec<DeliveryOutcome>,
    /// When the dispatch started.
    pub started_at: DateTime<Utc>,
    /// When the last job reported.
    pub finished_at: DateTime<Utc>,
}

impl DispatchReport {
    /// Number of successful deliveries.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    /// Number of failed deliveries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len().saturating_sub(self.delivered())
    }

    /// Number of delivery attempts made.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the outcome recorded for `address`, if any.
    #[must_use]
    pub fn outcome_for(&self, address: &str) -> Option<&DeliveryOutcome> {
        self.outcomes.iter().find(|o| o.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<DeliveryOutcome>) -> DispatchReport {
        DispatchReport {
            topic: "weather".to_string(),
            resolution: DispatchResolution::Matched {
                subscribers: outcomes.len(),
            },
            outcomes,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn counts_split_by_status() {
        let report = report(vec![
            DeliveryOutcome::delivered("a@x.com"),
            DeliveryOutcome::failed("b@x.com", &DeliveryError::Transport("down".to_string())),
            DeliveryOutcome::delivered("c@x.com"),
        ]);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn failed_outcome_keeps_reason() {
        let outcome =
            DeliveryOutcome::failed("b@x.com", &DeliveryError::Transport("down".to_string()));
        assert!(!outcome.is_delivered());
        assert_eq!(outcome.error.as_deref(), Some("transport error: down"));
    }

    #[test]
    fn resolution_serializes_with_kind_tag() {
        let json = serde_json::to_string(&DispatchResolution::NoSubscribers).unwrap_or_default();
        assert_eq!(json, r#"{"kind":"no_subscribers"}"#);
    }
}
