//! notify-relay server entry point.
//!
//! Connects the configured collaborators, starts the broker relay, and
//! serves the HTTP and WebSocket endpoints until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use notify_relay::api;
use notify_relay::app_state::AppState;
use notify_relay::broker::{Broker, InMemoryBroker, NatsBroker};
use notify_relay::config::RelayConfig;
use notify_relay::domain::{EventBus, InMemoryRegistry, Message, SubscriberRegistry};
use notify_relay::notify::{Mailer, MemoryMailer, NotificationSender, ResendMailer};
use notify_relay::persistence::PostgresRegistry;
use notify_relay::service::{BrokerRelay, DispatchCoordinator, RelayService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;
    init_tracing();
    tracing::info!(addr = %config.listen_addr, "starting notify-relay");

    // Collaborators. Connection failures here abort startup.
    let registry = build_registry(&config).await?;
    let (broker, inbound) = build_broker(&config).await?;
    let mailer = build_mailer(&config)?;

    // Dispatch core
    let event_bus = EventBus::new(config.event_bus_capacity);
    let sender = NotificationSender::new(mailer, config.mail_from.clone(), config.send_timeout());
    let coordinator = Arc::new(
        DispatchCoordinator::new(Arc::clone(&registry), sender, event_bus.clone())
            .with_max_concurrency(config.dispatch_max_concurrency),
    );

    let shutdown = CancellationToken::new();
    let relay = tokio::spawn(
        BrokerRelay::new(coordinator)
            .with_max_in_flight(config.relay_max_in_flight)
            .run(inbound, shutdown.clone()),
    );

    // Request path
    let relay_service = Arc::new(RelayService::new(registry, broker, event_bus));
    let app = api::build_app(AppState::new(relay_service), config.request_timeout());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(err = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutdown requested, draining http requests");
        })
        .await?;

    // HTTP is drained, so nothing publishes anymore. The relay dispatches
    // whatever is still buffered before it stops.
    shutdown.cancel();
    match relay.await {
        Ok(relayed) => tracing::info!(relayed, "shutdown complete"),
        Err(e) => tracing::error!(err = %e, "broker relay task failed"),
    }

    Ok(())
}

/// Installs the global tracing subscriber. `LOG_FORMAT=json` switches to
/// JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_registry(config: &RelayConfig) -> anyhow::Result<Arc<dyn SubscriberRegistry>> {
    if config.persistence_enabled {
        let registry = PostgresRegistry::connect(config)
            .await
            .context("connecting subscriber store")?;
        Ok(Arc::new(registry))
    } else {
        tracing::warn!("persistence disabled, subscribers are kept in memory");
        Ok(Arc::new(InMemoryRegistry::new()))
    }
}

async fn build_broker(
    config: &RelayConfig,
) -> anyhow::Result<(Arc<dyn Broker>, mpsc::Receiver<Message>)> {
    match config.nats_url.as_deref() {
        Some(url) => {
            let (broker, inbound) =
                NatsBroker::connect(url, &config.nats_subject_prefix, config.broker_capacity)
                    .await
                    .context("connecting broker")?;
            Ok((Arc::new(broker), inbound))
        }
        None => {
            tracing::info!("no NATS_URL set, using in-process broker");
            let (broker, inbound) = InMemoryBroker::new(config.broker_capacity);
            Ok((Arc::new(broker), inbound))
        }
    }
}

fn build_mailer(config: &RelayConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match config.resend_api_key.as_deref() {
        Some(key) => {
            let mailer = ResendMailer::new(&config.resend_api_url, key, config.send_timeout())
                .context("building mail client")?;
            Ok(Arc::new(mailer))
        }
        None => {
            tracing::warn!("no RESEND_API_KEY set, notifications go to the in-memory outbox");
            Ok(Arc::new(MemoryMailer::new()))
        }
    }
}
