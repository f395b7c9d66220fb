//! Subscriber aggregate: a notification address and its topic interests.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered notification recipient.
///
/// The `address` is the registry key. `topics` is a set, so a topic name
/// appears at most once per subscriber no matter how often it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    /// Notification address (an email address).
    pub address: String,

    /// Topic names this subscriber is interested in.
    pub topics: BTreeSet<String>,

    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl Subscriber {
    /// Creates a subscriber with an empty topic set.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            topics: BTreeSet::new(),
            registered_at: Utc::now(),
        }
    }

    /// Adds a topic. Returns `false` if it was already present.
    pub fn add_topic(&mut self, topic: impl Into<String>) -> bool {
        self.topics.insert(topic.into())
    }

    /// Returns `true` if this subscriber is interested in `topic`.
    ///
    /// Topics match exactly and case-sensitively.
    #[must_use]
    pub fn is_interested_in(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subscriber_has_no_topics() {
        let sub = Subscriber::new("a@x.com");
        assert_eq!(sub.address, "a@x.com");
        assert!(sub.topics.is_empty());
    }

    #[test]
    fn add_topic_is_idempotent() {
        let mut sub = Subscriber::new("a@x.com");
        assert!(sub.add_topic("weather"));
        assert!(!sub.add_topic("weather"));
        assert_eq!(sub.topics.len(), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut sub = Subscriber::new("a@x.com");
        sub.add_topic("Weather");
        assert!(sub.is_interested_in("Weather"));
        assert!(!sub.is_interested_in("weather"));
        assert!(!sub.is_interested_in("Weather.today"));
    }
}
