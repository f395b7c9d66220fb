//! Published messages as they travel from the broker to the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message received from the broker transport.
///
/// Ephemeral: it is handed to the dispatcher once and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Target topic (exact-match key).
    pub topic: String,

    /// Opaque payload, used verbatim as the notification body.
    pub payload: String,

    /// When the relay received the message from the broker.
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            received_at: Utc::now(),
        }
    }
}
