//! Per-connection topic filter.
//!
//! Tracks which topics a WebSocket observer wants relay events for and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::RelayEvent;

/// Manages the set of topic filters for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct TopicFilter {
    /// Watched topics. Ignored when `watch_all` is set.
    topics: HashSet<String>,
    /// Whether the observer watches every topic (wildcard `"*"`).
    watch_all: bool,
}

impl TopicFilter {
    /// Creates a filter that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics to the filter. `"*"` enables the wildcard.
    pub fn watch<'a>(&mut self, topics: impl IntoIterator<Item = &'a str>) {
        for topic in topics {
            if topic == "*" {
                self.watch_all = true;
            } else {
                self.topics.insert(topic.to_string());
            }
        }
    }

    /// Removes topics from the filter. `"*"` disables the wildcard.
    pub fn unwatch<'a>(&mut self, topics: impl IntoIterator<Item = &'a str>) {
        for topic in topics {
            if topic == "*" {
                self.watch_all = false;
            } else {
                self.topics.remove(topic);
            }
        }
    }

    /// Returns `true` if `event` should be forwarded.
    ///
    /// Events without a topic (registrations) only pass the wildcard.
    #[must_use]
    pub fn matches(&self, event: &RelayEvent) -> bool {
        if self.watch_all {
            return true;
        }
        event.topic().is_some_and(|t| self.topics.contains(t))
    }

    /// Returns the number of explicitly watched topics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.topics.len()
    }

    /// Returns `true` if the wildcard is active.
    #[must_use]
    pub fn is_watching_all(&self) -> bool {
        self.watch_all
    }
}
