//! Domain layer: core types, subscription registry, and event system.
//!
//! This module contains the relay's domain model: subscribers and their
//! topic interests, published messages, per-delivery outcomes, the
//! registry contract with its in-memory implementation, and the event bus
//! for broadcasting relay activity.

pub mod event_bus;
pub mod message;
pub mod outcome;
pub mod relay_event;
pub mod subscriber;
pub mod subscriber_registry;

pub use event_bus::EventBus;
pub use message::Message;
pub use outcome::{DeliveryOutcome, DeliveryStatus, DispatchReport, DispatchResolution};
pub use relay_event::RelayEvent;
pub use subscriber::Subscriber;
pub use subscriber_registry::{InMemoryRegistry, SubscriberRegistry};
