//! Publish DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /publish`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Target topic.
    #[serde(default)]
    pub topic: Option<String>,
    /// Message payload. Strings are sent verbatim; any other JSON value is
    /// sent as its JSON text.
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl PublishRequest {
    /// Returns the payload as text, or `None` when absent or `null`.
    #[must_use]
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Response body for `POST /publish`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Topic the message was published on.
    pub topic: String,
    /// Always `"accepted"`: delivery is asynchronous.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<PublishRequest> {
        serde_json::from_str(json).ok()
    }

    #[test]
    fn string_message_is_verbatim() {
        let req = parse(r#"{"topic":"weather","message":"<b>rain</b>"}"#);
        assert_eq!(req.and_then(|r| r.message_text()), Some("<b>rain</b>".to_string()));
    }

    #[test]
    fn structured_message_is_json_text() {
        let req = parse(r#"{"topic":"weather","message":{"temp":3}}"#);
        assert_eq!(req.and_then(|r| r.message_text()), Some(r#"{"temp":3}"#.to_string()));
    }

    #[test]
    fn null_message_is_missing() {
        let req = parse(r#"{"topic":"weather","message":null}"#);
        assert_eq!(req.and_then(|r| r.message_text()), None);
    }
}
