//! Dashboard API: login plus the JWT-protected operator endpoints.
//!
//! Everything below `/login` takes the [`RequireAdmin`] extractor; a
//! missing or expired token is rejected with 401 before the handler runs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use lastcall_core::{DrinkId, OrderId};

use crate::auth::{AuthError, RequireAdmin};
use crate::db::StockRecord;
use crate::error::{AppError, Result};
use crate::queue::Order;
use crate::services::ordering;
use crate::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Login response carrying the bearer token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /login - exchange the dashboard password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let expected = state.config().dashboard_pass.expose_secret();
    if request.password != expected {
        tracing::warn!("dashboard login failed");
        return Err(AuthError::InvalidPassword.into());
    }

    let token = state.jwt().sign_admin()?;
    tracing::info!("dashboard login succeeded");
    Ok(Json(LoginResponse { token }))
}

/// GET /queue - pending orders in queue order.
pub async fn queue(_admin: RequireAdmin, State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.queue().list())
}

/// Serve request by stable order id.
#[derive(Debug, Deserialize)]
pub struct DoneRequest {
    pub id: OrderId,
}

/// POST /done - mark an order served.
pub async fn done(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<DoneRequest>,
) -> Result<Json<Order>> {
    let order = ordering::serve_by_id(&state, request.id).await?;
    Ok(Json(order))
}

/// Clear response.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

/// POST /clear - drop every pending order.
pub async fn clear(_admin: RequireAdmin, State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = ordering::clear_queue(&state);
    Json(ClearResponse { cleared })
}

/// Stock adjustment: either a relative delta or an absolute value.
#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub id: DrinkId,
    #[serde(default)]
    pub delta: Option<i32>,
    #[serde(default)]
    pub absolute: Option<i32>,
}

/// POST /stock - adjust a drink's stock counter.
pub async fn stock(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<StockRequest>,
) -> Result<Json<StockRecord>> {
    let record = match (request.delta, request.absolute) {
        (Some(delta), None) => state.drinks().adjust_delta(request.id, delta).await?,
        (None, Some(value)) => state.drinks().set_absolute(request.id, value).await?,
        _ => {
            return Err(AppError::BadRequest(
                "provide exactly one of delta or absolute".to_string(),
            ));
        }
    };
    Ok(Json(record))
}

/// New drink request.
#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub canonical_id: String,
    pub display_name: String,
    #[serde(default)]
    pub initial_stock: i32,
}

/// POST /drinks - add a drink to the stock ledger.
///
/// The new drink appears on the menu right away, but ordering on every
/// channel resolves against the catalog file, so it becomes orderable
/// only once it is also listed there.
pub async fn create_drink(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateDrinkRequest>,
) -> Result<(StatusCode, Json<StockRecord>)> {
    let canonical_id = request.canonical_id.trim().to_lowercase();
    let display_name = request.display_name.trim().to_string();
    if canonical_id.is_empty() || display_name.is_empty() {
        return Err(AppError::BadRequest(
            "canonical_id and display_name are required".to_string(),
        ));
    }

    let record = state
        .drinks()
        .create(&canonical_id, &display_name, request.initial_stock)
        .await?;
    tracing::info!(canonical_id = %record.canonical_id, "drink created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /drinks/{id} - remove a drink from the stock ledger.
pub async fn delete_drink(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DrinkId>,
) -> Result<StatusCode> {
    state.drinks().delete(id).await?;
    tracing::info!(drink_id = id.get(), "drink deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Reload response.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub entries: usize,
}

/// POST /admin/reload-drinks - re-read the catalog file.
///
/// On failure the previous catalog stays active and the error is returned.
pub async fn reload_drinks(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>> {
    let entries = state.catalog().reload()?;
    tracing::info!(entries, "drink catalog reloaded");
    Ok(Json(ReloadResponse { entries }))
}
