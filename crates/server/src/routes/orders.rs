//! Public web ordering: the menu and the order endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use lastcall_core::{Channel, OrderId};

use crate::db::StockRecord;
use crate::error::{AppError, Result};
use crate::services::ordering::{self, PlaceOrder, Placement};
use crate::state::AppState;

/// One menu line as shown to customers.
#[derive(Debug, Serialize)]
pub struct MenuItem {
    pub canonical_id: String,
    pub display_name: String,
    pub in_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<StockRecord> for MenuItem {
    fn from(record: StockRecord) -> Self {
        Self {
            canonical_id: record.canonical_id,
            display_name: record.display_name,
            // Counts are operator information; customers only see yes/no.
            in_stock: record.stock_count > 0,
            description: record.description,
            image_url: record.image_url,
        }
    }
}

/// GET /menu - the public drink list.
pub async fn menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>> {
    let records = state.drinks().list_menu().await?;
    Ok(Json(records.into_iter().map(MenuItem::from).collect()))
}

/// Order request from the web menu.
///
/// The menu UI sends a `canonical_id` from the listing; free text is also
/// accepted so the same endpoint can back a search box.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub canonical_id: Option<String>,
    #[serde(default)]
    pub drink: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub client_tag: Option<String>,
}

/// Order acknowledgement.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub canonical_id: String,
    pub display_name: String,
}

/// POST /order - place an order from the web menu.
pub async fn place(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let text = request
        .canonical_id
        .or(request.drink)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing drink".to_string()))?;

    let customer_ref = request
        .client_tag
        .clone()
        .unwrap_or_else(|| "web".to_string());
    let customer_name = request
        .customer_name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Guest".to_string());

    let placement = ordering::place_order(
        &state,
        PlaceOrder {
            channel: Channel::Web,
            customer_ref,
            customer_name,
            text: text.clone(),
            client_tag: request.client_tag,
        },
    )
    .await?;

    match placement {
        Placement::Accepted(order) => Ok((
            StatusCode::CREATED,
            Json(OrderResponse {
                id: order.id,
                canonical_id: order.canonical_id,
                display_name: order.display_name,
            }),
        )),
        // Tutorial-noise detection exists for the messaging channels; a web
        // client sending it gets the same answer an unknown drink would.
        Placement::Ignored => Err(AppError::UnresolvedDrink(text)),
    }
}
