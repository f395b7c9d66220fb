//! Shared harness: the full relay wired with in-process collaborators.

#![allow(dead_code, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use notify_relay::api;
use notify_relay::app_state::AppState;
use notify_relay::broker::InMemoryBroker;
use notify_relay::domain::{EventBus, InMemoryRegistry, RelayEvent, SubscriberRegistry};
use notify_relay::notify::{Mailer, MemoryMailer, NotificationSender};
use notify_relay::service::{BrokerRelay, DispatchCoordinator, RelayService};

pub struct Harness {
    pub app: Router,
    pub mailer: Arc<MemoryMailer>,
    pub events: EventBus,
    pub shutdown: CancellationToken,
}

impl Harness {
    pub fn new() -> Self {
        let registry: Arc<dyn SubscriberRegistry> = Arc::new(InMemoryRegistry::new());
        let (broker, inbound) = InMemoryBroker::new(64);
        let mailer = Arc::new(MemoryMailer::new());
        let events = EventBus::new(1024);

        let sender = NotificationSender::new(
            Arc::clone(&mailer) as Arc<dyn Mailer>,
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

        let service = Arc::new(RelayService::new(registry, Arc::new(broker), events.clone()));
        let app = api::build_app(AppState::new(service), Duration::from_secs(5));

        Self {
            app,
            mailer,
            events,
            shutdown,
        }
    }

    pub async fn post(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.post_raw(uri, &body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("invalid request");
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("invalid request");
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let Ok(response) = self.app.clone().oneshot(request).await else {
            panic!("router failed");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("unreadable body");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub async fn register(&self, email: &str) {
        let (status, _) = self.post("/register", serde_json::json!({ "email": email })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    pub async fn subscribe(&self, email: &str, topic: &str) {
        let (status, _) = self
            .post("/subscribe", serde_json::json!({ "email": email, "topic": topic }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Publishes and waits for the matching `dispatch_completed` event.
    pub async fn publish_and_wait(&self, topic: &str, message: &str) -> (StatusCode, RelayEvent) {
        let mut rx = self.events.subscribe();
        let (status, _) = self
            .post("/publish", serde_json::json!({ "topic": topic, "message": message }))
            .await;

        let wait = async {
            loop {
                let Ok(event) = rx.recv().await else {
                    panic!("event bus closed");
                };
                if matches!(event, RelayEvent::DispatchCompleted { .. })
                    && event.topic() == Some(topic)
                {
                    return event;
                }
            }
        };
        let Ok(event) = tokio::time::timeout(Duration::from_secs(5), wait).await else {
            panic!("dispatch did not complete");
        };
        (status, event)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
