//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Public
//! GET  /menu                   - Drink list with in-stock flags
//! POST /order                  - Place an order from the web menu
//! POST /push/subscribe         - Register a browser for ready notifications
//!
//! # Channel webhooks
//! GET  /webhook                - WhatsApp subscription handshake
//! POST /webhook                - Inbound WhatsApp messages
//! POST /sms-webhook            - Inbound SMS (Twilio)
//!
//! # Dashboard
//! POST /login                  - Exchange password for a bearer token
//! GET  /events                 - Queue transitions (SSE)
//!
//! # Dashboard (requires bearer token)
//! GET    /queue                - Pending orders
//! POST   /done                 - Serve an order by id
//! POST   /clear                - Drop every pending order
//! POST   /stock                - Adjust a stock counter
//! POST   /drinks               - Add a drink
//! DELETE /drinks/{id}          - Remove a drink
//! POST   /admin/reload-drinks  - Re-read the catalog file
//! ```

pub mod dashboard;
pub mod events;
pub mod orders;
pub mod push;
pub mod sms;
pub mod webhook;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the public routes router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(orders::menu))
        .route("/order", post(orders::place))
        .route("/push/subscribe", post(push::subscribe))
        .route("/events", get(events::stream))
}

/// Create the channel webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        .route("/sms-webhook", post(sms::receive))
}

/// Create the dashboard routes router.
///
/// Handlers behind `/login` carry the `RequireAdmin` extractor.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(dashboard::login))
        .route("/queue", get(dashboard::queue))
        .route("/done", post(dashboard::done))
        .route("/clear", post(dashboard::clear))
        .route("/stock", post(dashboard::stock))
        .route("/drinks", post(dashboard::create_drink))
        .route("/drinks/{id}", delete(dashboard::delete_drink))
        .route("/admin/reload-drinks", post(dashboard::reload_drinks))
}

/// Liveness check.
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness check: verifies the database connection.
pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
