//! Service layer: request-path orchestration and the dispatch core.
//!
//! [`RelayService`] serves registration, subscription and publish calls.
//! [`BrokerRelay`] reads inbound broker messages and hands each one to
//! the [`DispatchCoordinator`], which fans it out to subscribers.

pub mod broker_relay;
pub mod dispatcher;
pub mod relay_service;

pub use broker_relay::BrokerRelay;
pub use dispatcher::DispatchCoordinator;
pub use relay_service::RelayService;
