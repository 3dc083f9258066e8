//! Push subscription registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::db::PushSubscriptionRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Subscription registration request.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub client_tag: String,
    /// The browser's `PushSubscription.toJSON()` output, stored verbatim.
    pub subscription: serde_json::Value,
}

/// POST /push/subscribe - register a browser for ready notifications.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<StatusCode> {
    let client_tag = request.client_tag.trim();
    if client_tag.is_empty() {
        return Err(AppError::BadRequest("missing client_tag".to_string()));
    }
    if !request.subscription.is_object() {
        return Err(AppError::BadRequest(
            "subscription must be an object".to_string(),
        ));
    }

    PushSubscriptionRepository::new(state.pool())
        .upsert(client_tag, &request.subscription)
        .await?;

    tracing::info!(client_tag, "push subscription stored");
    Ok(StatusCode::NO_CONTENT)
}
