//! WebSocket layer: live stream of relay events.
//!
//! The endpoint at `/ws` lets observers watch registrations, publishes
//! and per-subscriber delivery outcomes as they happen, filtered by
//! topic.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
