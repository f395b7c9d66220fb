//! Registration and subscription DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Subscriber;

/// Request body for `POST /register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Notification address to register.
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for `POST /subscribe`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    /// Registered notification address.
    #[serde(default)]
    pub email: Option<String>,
    /// Topic to subscribe to (exact, case-sensitive).
    #[serde(default)]
    pub topic: Option<String>,
}

/// Response body for `POST /subscribe`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscribeResponse {
    /// Subscriber address.
    pub email: String,
    /// Topic subscribed to.
    pub topic: String,
    /// `false` when the subscriber already had the topic.
    pub newly_added: bool,
    /// Human-readable confirmation.
    pub message: String,
}

/// Subscriber representation returned by `POST /register` and
/// `GET /subscribers/{email}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberDto {
    /// Notification address.
    pub email: String,
    /// Subscribed topics, sorted.
    pub topics: Vec<String>,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberDto {
    fn from(subscriber: Subscriber) -> Self {
        Self {
            email: subscriber.address,
            topics: subscriber.topics.into_iter().collect(),
            registered_at: subscriber.registered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_none() {
        let req: Option<SubscribeRequest> = serde_json::from_str(r#"{"email":"a@x.com"}"#).ok();
        assert!(matches!(
            req,
            Some(SubscribeRequest { email: Some(_), topic: None })
        ));
    }

    #[test]
    fn subscriber_dto_lists_topics() {
        let mut sub = Subscriber::new("a@x.com");
        sub.add_topic("weather");
        sub.add_topic("sports");
        let dto = SubscriberDto::from(sub);
        assert_eq!(dto.topics, vec!["sports".to_string(), "weather".to_string()]);
    }
}
