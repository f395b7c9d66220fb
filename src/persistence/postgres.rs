//! PostgreSQL implementation of the subscription registry.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::SubscriberRow;
use crate::config::RelayConfig;
use crate::domain::{Subscriber, SubscriberRegistry};
use crate::error::RelayError;

/// PostgreSQL-backed registry using `sqlx::PgPool`.
///
/// One row per subscriber; topics live in a `TEXT[]` column. Topic
/// additions are single conditional `UPDATE` statements, so racing calls
/// on the same address are serialized by the row lock and never lose an
/// update.
#[derive(Debug, Clone)]
pub struct PostgresRegistry {
    pool: PgPool,
}

impl PostgresRegistry {
    /// Creates a new registry over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the database settings in `config` and applies the
    /// bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] if the database cannot be
    /// reached or a migration fails.
    pub async fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RelayError::Persistence(e.to_string()))?;

        tracing::info!("subscriber store connected");
        Ok(Self::new(pool))
    }

    async fn exists(&self, address: &str) -> Result<bool, RelayError> {
        let found = sqlx::query_scalar::<_, i32>("SELECT 1 FROM subscribers WHERE address = $1")
            .bind(address)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl SubscriberRegistry for PostgresRegistry {
    async fn register(&self, address: &str) -> Result<Subscriber, RelayError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            "INSERT INTO subscribers (address, topics) VALUES ($1, '{}') \
             ON CONFLICT (address) DO NOTHING \
             RETURNING address, topics, registered_at",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Subscriber::from)
            .ok_or_else(|| RelayError::DuplicateSubscriber(address.to_string()))
    }

    async fn add_topic(&self, address: &str, topic: &str) -> Result<bool, RelayError> {
        let result = sqlx::query(
            "UPDATE subscribers SET topics = array_append(topics, $2) \
             WHERE address = $1 AND NOT ($2 = ANY(topics))",
        )
        .bind(address)
        .bind(topic)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.exists(address).await? {
            Ok(false)
        } else {
            Err(RelayError::SubscriberNotFound(address.to_string()))
        }
    }

    async fn find_by_topic(&self, topic: &str) -> Result<Vec<Subscriber>, RelayError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            "SELECT address, topics, registered_at FROM subscribers \
             WHERE $1 = ANY(topics) ORDER BY address",
        )
        .bind(topic)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subscriber::from).collect())
    }

    async fn get(&self, address: &str) -> Result<Option<Subscriber>, RelayError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            "SELECT address, topics, registered_at FROM subscribers WHERE address = $1",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscriber::from))
    }
}
