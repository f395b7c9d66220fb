//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single observer connection: applies
//! watch/unwatch commands and forwards matching relay events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::TopicFilter;
use crate::domain::RelayEvent;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and updates its [`TopicFilter`].
/// - Forwards matching events from the [`broadcast::Receiver`] to the
///   client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<RelayEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut filter = TopicFilter::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(text.as_str(), &mut filter);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(relay_event) => {
                        if !filter.matches(&relay_event) {
                            continue;
                        }
                        let payload = serde_json::to_value(&relay_event).unwrap_or_default();
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            payload,
                        );
                        let Some(json) = msg.to_json() else { continue };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws observer lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON
/// response.
fn handle_text_message(text: &str, filter: &mut TopicFilter) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_message(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return error_message(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Watch { topics } => {
            filter.watch(topics.iter().map(String::as_str));
            serde_json::json!({
                "watching": topics,
                "count": filter.count(),
                "wildcard": filter.is_watching_all(),
            })
        }
        WsCommand::Unwatch { topics } => {
            filter.unwatch(topics.iter().map(String::as_str));
            serde_json::json!({
                "unwatched": topics,
                "remaining_count": filter.count(),
                "wildcard": filter.is_watching_all(),
            })
        }
    };

    WsMessage::new(msg.id, WsMessageType::Response, payload).to_json()
}

fn error_message(id: String, code: u16, message: &str) -> Option<String> {
    WsMessage::new(
        id,
        WsMessageType::Error,
        serde_json::json!({ "code": code, "message": message }),
    )
    .to_json()
}
