//! Persistence layer: durable PostgreSQL subscriber storage.
//!
//! [`PostgresRegistry`] implements [`crate::domain::SubscriberRegistry`]
//! on top of `sqlx::PgPool`. It is selected at startup when
//! `PERSISTENCE_ENABLED` is set; otherwise the relay keeps subscribers in
//! process memory.

pub mod models;
pub mod postgres;

pub use postgres::PostgresRegistry;
