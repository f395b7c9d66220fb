//! Subscription registry contract and its in-memory implementation.
//!
//! [`SubscriberRegistry`] is the seam between the relay and subscriber
//! storage. The dispatcher only reads through it (`find_by_topic`); the
//! request path writes through it (`register`, `add_topic`).
//!
//! [`InMemoryRegistry`] stores each subscriber behind its own
//! [`tokio::sync::RwLock`], so topic additions on one subscriber are
//! serialized while reads and writes on different subscribers proceed
//! concurrently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Subscriber;
use crate::error::RelayError;

/// Storage of subscribers and their topic interests.
///
/// Implementations must make per-subscriber mutation atomic: two racing
/// `add_topic` calls on the same address must both be reflected.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync + fmt::Debug {
    /// Registers `address` with an empty topic set.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DuplicateSubscriber`] if the address is
    /// already registered (the existing subscriber is left untouched), or
    /// [`RelayError::Persistence`] on storage failure.
    async fn register(&self, address: &str) -> Result<Subscriber, RelayError>;

    /// Adds `topic` to the subscriber's topic set.
    ///
    /// Idempotent. Returns `true` if the topic was newly added and `false`
    /// if the subscriber already had it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::SubscriberNotFound`] if the address is not
    /// registered, or [`RelayError::Persistence`] on storage failure.
    async fn add_topic(&self, address: &str, topic: &str) -> Result<bool, RelayError>;

    /// Returns every subscriber interested in `topic`.
    ///
    /// An empty vector means nobody matched; it is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] if the lookup itself failed.
    async fn find_by_topic(&self, topic: &str) -> Result<Vec<Subscriber>, RelayError>;

    /// Returns the subscriber registered under `address`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] on storage failure.
    async fn get(&self, address: &str) -> Result<Option<Subscriber>, RelayError>;
}

/// Process-local subscriber storage.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<Subscriber>>` for fine-grained locking.
///
/// # Concurrency
///
/// - Lookups run concurrently with each other.
/// - Topic additions to different subscribers are concurrent.
/// - Topic additions to the same subscriber are serialized.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    subscribers: RwLock<HashMap<String, Arc<RwLock<Subscriber>>>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered subscribers.
    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Returns `true` if nobody is registered.
    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriberRegistry for InMemoryRegistry {
    async fn register(&self, address: &str) -> Result<Subscriber, RelayError> {
        let mut map = self.subscribers.write().await;
        if map.contains_key(address) {
            return Err(RelayError::DuplicateSubscriber(address.to_string()));
        }
        let subscriber = Subscriber::new(address);
        map.insert(
            address.to_string(),
            Arc::new(RwLock::new(subscriber.clone())),
        );
        Ok(subscriber)
    }

    async fn add_topic(&self, address: &str, topic: &str) -> Result<bool, RelayError> {
        let entry = {
            let map = self.subscribers.read().await;
            map.get(address)
                .cloned()
                .ok_or_else(|| RelayError::SubscriberNotFound(address.to_string()))?
        };
        let mut subscriber = entry.write().await;
        Ok(subscriber.add_topic(topic))
    }

    async fn find_by_topic(&self, topic: &str) -> Result<Vec<Subscriber>, RelayError> {
        let map = self.subscribers.read().await;
        let mut matched = Vec::new();
        for entry in map.values() {
            let subscriber = entry.read().await;
            if subscriber.is_interested_in(topic) {
                matched.push(subscriber.clone());
            }
        }
        Ok(matched)
    }

    async fn get(&self, address: &str) -> Result<Option<Subscriber>, RelayError> {
        let entry = self.subscribers.read().await.get(address).cloned();
        match entry {
            Some(lock) => Ok(Some(lock.read().await.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_creates_empty_subscriber() {
        let registry = InMemoryRegistry::new();
        let Ok(sub) = registry.register("a@x.com").await else {
            panic!("registration failed");
        };
        assert!(sub.topics.is_empty());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_register_keeps_existing_topics() {
        let registry = InMemoryRegistry::new();
        let _ = registry.register("a@x.com").await;
        let _ = registry.add_topic("a@x.com", "weather").await;

        let result = registry.register("a@x.com").await;
        assert!(matches!(result, Err(RelayError::DuplicateSubscriber(_))));

        let Ok(Some(sub)) = registry.get("a@x.com").await else {
            panic!("subscriber missing");
        };
        assert!(sub.is_interested_in("weather"));
    }

    #[tokio::test]
    async fn add_topic_twice_stores_once() {
        let registry = InMemoryRegistry::new();
        let _ = registry.register("a@x.com").await;

        assert!(matches!(registry.add_topic("a@x.com", "weather").await, Ok(true)));
        assert!(matches!(registry.add_topic("a@x.com", "weather").await, Ok(false)));

        let Ok(Some(sub)) = registry.get("a@x.com").await else {
            panic!("subscriber missing");
        };
        assert_eq!(sub.topics.len(), 1);
    }

    #[tokio::test]
    async fn add_topic_for_unknown_address_fails() {
        let registry = InMemoryRegistry::new();
        let result = registry.add_topic("ghost@x.com", "weather").await;
        assert!(matches!(result, Err(RelayError::SubscriberNotFound(_))));
    }

    #[tokio::test]
    async fn find_by_topic_returns_only_matches() {
        let registry = InMemoryRegistry::new();
        let _ = registry.register("a@x.com").await;
        let _ = registry.register("b@x.com").await;
        let _ = registry.add_topic("a@x.com", "sports").await;

        let Ok(matched) = registry.find_by_topic("sports").await else {
            panic!("lookup failed");
        };
        assert_eq!(matched.len(), 1);
        assert!(matched.iter().all(|s| s.address == "a@x.com"));

        let Ok(none) = registry.find_by_topic("news").await else {
            panic!("lookup failed");
        };
        assert!(none.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_add_topic_loses_no_updates() {
        let registry = Arc::new(InMemoryRegistry::new());
        let _ = registry.register("a@x.com").await;

        let mut handles = Vec::new();
        for i in 0..50 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.add_topic("a@x.com", &format!("topic-{i}")).await
            }));
        }
        for handle in handles {
            let Ok(Ok(_)) = handle.await else {
                panic!("add_topic task failed");
            };
        }

        let Ok(Some(sub)) = registry.get("a@x.com").await else {
            panic!("subscriber missing");
        };
        assert_eq!(sub.topics.len(), 50);
    }
}
