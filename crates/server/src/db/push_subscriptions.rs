//! Push subscription repository.
//!
//! Browsers that order through the web menu register a push subscription
//! under a self-chosen client tag. The "ready" notification for a web order
//! is delivered to the subscription stored under the order's client tag.

use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// One row of the `push_subscriptions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PushSubscription {
    pub id: Uuid,
    pub client_tag: String,
    pub subscription: serde_json::Value,
}

/// Repository for push subscription database operations.
pub struct PushSubscriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PushSubscriptionRepository<'a> {
    /// Create a new push subscription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store or replace the subscription for a client tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        client_tag: &str,
        subscription: &serde_json::Value,
    ) -> Result<PushSubscription, RepositoryError> {
        let record = sqlx::query_as::<_, PushSubscription>(
            "INSERT INTO push_subscriptions (client_tag, subscription)
             VALUES ($1, $2)
             ON CONFLICT (client_tag) DO UPDATE
                SET subscription = EXCLUDED.subscription
          RETURNING id, client_tag, subscription",
        )
        .bind(client_tag)
        .bind(subscription)
        .fetch_one(self.pool)
        .await?;
        Ok(record)
    }

    /// Look up the subscription for a client tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_client_tag(
        &self,
        client_tag: &str,
    ) -> Result<Option<PushSubscription>, RepositoryError> {
        let record = sqlx::query_as::<_, PushSubscription>(
            "SELECT id, client_tag, subscription FROM push_subscriptions WHERE client_tag = $1",
        )
        .bind(client_tag)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// Drop a stale delivery target (gateway reported the subscription gone).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_client_tag(&self, client_tag: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM push_subscriptions WHERE client_tag = $1")
            .bind(client_tag)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
