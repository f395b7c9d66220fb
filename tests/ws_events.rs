//! WebSocket observers see delivery outcomes for the topics they watch.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use notify_relay::api;
use notify_relay::app_state::AppState;
use notify_relay::broker::InMemoryBroker;
use notify_relay::domain::{EventBus, InMemoryRegistry, SubscriberRegistry};
use notify_relay::notify::{MemoryMailer, NotificationSender};
use notify_relay::service::{BrokerRelay, DispatchCoordinator, RelayService};

async fn spawn_relay() -> (String, CancellationToken) {
    let registry: Arc<dyn SubscriberRegistry> = Arc::new(InMemoryRegistry::new());
    let (broker, inbound) = InMemoryBroker::new(64);
    let events = EventBus::new(1024);
    let sender = NotificationSender::new(
        Arc::new(MemoryMailer::new()),
        "relay@test.local",
        Duration::from_secs(2),
    );
    let coordinator = Arc::new(DispatchCoordinator::new(
        Arc::clone(&registry),
        sender,
        events.clone(),
    ));
    let shutdown = CancellationToken::new();
    tokio::spawn(BrokerRelay::new(coordinator).run(inbound, shutdown.clone()));

    let service = Arc::new(RelayService::new(registry, Arc::new(broker), events));
    let app = api::build_app(AppState::new(service), Duration::from_secs(5));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr.to_string(), shutdown)
}

async fn post(client: &reqwest::Client, url: String, body: serde_json::Value) -> u16 {
    let Ok(response) = client.post(url).json(&body).send().await else {
        panic!("request failed");
    };
    response.status().as_u16()
}

#[tokio::test]
async fn watched_topic_streams_delivery_outcome() {
    let (addr, shutdown) = spawn_relay().await;

    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    let watch = serde_json::json!({
        "id": "w1",
        "type": "command",
        "timestamp": "2025-01-01T00:00:00Z",
        "payload": { "command": "watch", "topics": ["weather"] }
    });
    let Ok(()) = ws.send(Message::text(watch.to_string())).await else {
        panic!("ws send failed");
    };
    // Wait for the watch acknowledgement so the filter is in place.
    let Some(Ok(_ack)) = ws.next().await else {
        panic!("no watch acknowledgement");
    };

    let client = reqwest::Client::new();
    let base = format!("http://{addr}");
    assert_eq!(
        post(&client, format!("{base}/register"), serde_json::json!({ "email": "a@x.com" })).await,
        201
    );
    assert_eq!(
        post(
            &client,
            format!("{base}/subscribe"),
            serde_json::json!({ "email": "a@x.com", "topic": "weather" })
        )
        .await,
        200
    );
    assert_eq!(
        post(
            &client,
            format!("{base}/publish"),
            serde_json::json!({ "topic": "weather", "message": "rain" })
        )
        .await,
        202
    );

    let wait = async {
        loop {
            let Some(Ok(frame)) = ws.next().await else {
                panic!("ws closed");
            };
            let Ok(text) = frame.to_text() else {
                continue;
            };
            let Ok(msg) = serde_json::from_str::<serde_json::Value>(text) else {
                continue;
            };
            let Some(payload) = msg.get("payload") else {
                continue;
            };
            if payload.get("event_type") == Some(&serde_json::json!("delivery_attempted")) {
                return payload.clone();
            }
        }
    };
    let Ok(payload) = tokio::time::timeout(Duration::from_secs(5), wait).await else {
        panic!("no delivery event received");
    };

    assert_eq!(payload.get("topic"), Some(&serde_json::json!("weather")));
    let outcome = payload.get("outcome").cloned().unwrap_or_default();
    assert_eq!(outcome.get("address"), Some(&serde_json::json!("a@x.com")));
    assert_eq!(outcome.get("status"), Some(&serde_json::json!("delivered")));

    shutdown.cancel();
}
