//! Database models for subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Subscriber;

/// A stored row from the `subscribers` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubscriberRow {
    /// Notification address (primary key).
    pub address: String,
    /// Topic names, duplicate-free.
    pub topics: Vec<String>,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            address: row.address,
            topics: row.topics.into_iter().collect(),
            registered_at: row.registered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_collapses_duplicate_topics() {
        let row = SubscriberRow {
            address: "a@x.com".to_string(),
            topics: vec!["weather".to_string(), "weather".to_string()],
            registered_at: Utc::now(),
        };
        let sub = Subscriber::from(row);
        assert_eq!(sub.topics.len(), 1);
        assert!(sub.is_interested_in("weather"));
    }
}
