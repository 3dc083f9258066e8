//! WhatsApp Cloud API webhook handlers.
//!
//! Meta delivers two things here: a one-time GET subscription handshake,
//! and POSTed message batches. The POST handler always answers 200 once the
//! payload parses: Meta retries on anything else, and a retried order
//! would double-decrement stock.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use lastcall_core::{Channel, PhoneNumber};

use crate::error::AppError;
use crate::services::ordering::{self, PlaceOrder, Placement};
use crate::state::AppState;

/// Query parameters of the subscription handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Webhook payload: Meta wraps messages several levels deep.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// GET /webhook - subscription handshake.
///
/// Echo the challenge when the verify token matches; 403 otherwise.
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let expected = state
        .config()
        .whatsapp
        .as_ref()
        .map(|w| w.verify_token.as_str());

    match (params.mode.as_deref(), params.verify_token, expected) {
        (Some("subscribe"), Some(token), Some(expected)) if token == expected => {
            tracing::info!("webhook subscription verified");
            (StatusCode::OK, params.challenge.unwrap_or_default())
        }
        _ => {
            tracing::warn!("webhook verification failed");
            (StatusCode::FORBIDDEN, String::new())
        }
    }
}

/// POST /webhook - inbound WhatsApp messages.
///
/// Status-only notifications (delivery receipts) carry no `messages` array
/// and are acknowledged without further work.
pub async fn receive(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> StatusCode {
    for entry in payload.entry {
        for change in entry.changes {
            let profile_name = change
                .value
                .contacts
                .first()
                .and_then(|c| c.profile.as_ref())
                .and_then(|p| p.name.clone());

            for message in change.value.messages {
                if message.kind.as_deref() != Some("text") {
                    continue;
                }
                let Some(text) = &message.text else { continue };
                handle_message(&state, &message.from, profile_name.as_deref(), &text.body).await;
            }
        }
    }
    StatusCode::OK
}

/// Process one inbound text: admin command first, then the order flow.
async fn handle_message(state: &AppState, from: &str, profile_name: Option<&str>, body: &str) {
    let Ok(sender) = PhoneNumber::normalize(from) else {
        tracing::warn!(from, "unparseable sender number, dropping message");
        return;
    };

    if let Some(command) = state.admins().parse(&sender, body) {
        let reply = ordering::run_admin_command(state, command).await;
        state
            .dispatcher()
            .reply(Channel::Whatsapp, sender.as_str(), &reply)
            .await;
        return;
    }

    let customer_name = profile_name
        .and_then(|n| n.split_whitespace().next())
        .unwrap_or(sender.as_str())
        .to_string();

    let result = ordering::place_order(
        state,
        PlaceOrder {
            channel: Channel::Whatsapp,
            customer_ref: sender.as_str().to_string(),
            customer_name,
            text: body.to_string(),
            client_tag: None,
        },
    )
    .await;

    match result {
        Ok(Placement::Accepted(_) | Placement::Ignored) => {}
        Err(AppError::UnresolvedDrink(text)) => {
            let mut reply =
                format!("Sorry, we couldn't find \"{text}\" on the menu.");
            if let Some(hint) = state.dispatcher().menu_hint() {
                reply.push(' ');
                reply.push_str(&hint);
            }
            state
                .dispatcher()
                .reply(Channel::Whatsapp, sender.as_str(), &reply)
                .await;
        }
        Err(AppError::OutOfStock(display_name)) => {
            let reply = format!("Sorry, we're out of {display_name} right now.");
            state
                .dispatcher()
                .reply(Channel::Whatsapp, sender.as_str(), &reply)
                .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "order flow failed for inbound message");
        }
    }
}
