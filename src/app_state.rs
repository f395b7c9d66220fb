//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service for registration, subscription and publishing.
    pub relay_service: Arc<RelayService>,
    /// Event bus for WebSocket observers.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds the state from a service, sharing its event bus.
    #[must_use]
    pub fn new(relay_service: Arc<RelayService>) -> Self {
        let event_bus = relay_service.event_bus().clone();
        Self {
            relay_service,
            event_bus,
        }
    }
}
