//! Database operations for the Last Call `PostgreSQL` store.
//!
//! # Tables
//!
//! - `drinks` - Drink catalog rows with the durable stock counter
//! - `push_subscriptions` - Web push delivery targets keyed by client tag
//!
//! The live order queue is *not* here by design; only stock counts and push
//! subscriptions survive a restart.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p lastcall-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod drinks;
pub mod push_subscriptions;

pub use drinks::{DrinkRepository, StockRecord};
pub use push_subscriptions::{PushSubscription, PushSubscriptionRepository};

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate canonical id).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Caller passed a value the schema forbids (e.g., negative stock).
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
