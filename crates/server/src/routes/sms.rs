//! Twilio SMS webhook handler.
//!
//! Twilio POSTs form-encoded message events. Compliance keywords (STOP,
//! HELP, START families) are handled before anything else; an opted-out
//! number gets no replies of any kind until it opts back in. The
//! dispatcher appends the carrier-mandated footer to every outbound SMS,
//! so replies here are written without it. Like the WhatsApp webhook,
//! this always answers 200 so the carrier does not retry and
//! double-order.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;

use lastcall_core::{Channel, PhoneNumber};

use crate::error::AppError;
use crate::services::optout::{self, KeywordKind};
use crate::services::ordering::{self, PlaceOrder, Placement};
use crate::state::AppState;

/// Twilio message webhook form fields.
#[derive(Debug, Deserialize)]
pub struct SmsForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// POST /sms-webhook - inbound SMS.
pub async fn receive(State(state): State<AppState>, Form(form): Form<SmsForm>) -> StatusCode {
    let Ok(sender) = PhoneNumber::normalize(&form.from) else {
        tracing::warn!(from = %form.from, "unparseable SMS sender, dropping");
        return StatusCode::OK;
    };

    match optout::classify_keyword(&form.body) {
        Some(KeywordKind::Stop) => {
            state.opt_outs().opt_out(&sender);
            tracing::info!(sender = %sender, "SMS opt-out recorded");
            // Carriers send the mandated confirmation themselves.
            return StatusCode::OK;
        }
        Some(KeywordKind::OptIn) => {
            state.opt_outs().opt_in(&sender);
            state
                .dispatcher()
                .reply(Channel::Sms, sender.as_str(), "You're opted back in.")
                .await;
            return StatusCode::OK;
        }
        Some(KeywordKind::Help) => {
            let reply = state.dispatcher().help_reply();
            state
                .dispatcher()
                .reply(Channel::Sms, sender.as_str(), &reply)
                .await;
            return StatusCode::OK;
        }
        None => {}
    }

    if state.opt_outs().is_opted_out(&sender) {
        tracing::debug!(sender = %sender, "message from opted-out number ignored");
        return StatusCode::OK;
    }

    if let Some(command) = state.admins().parse(&sender, &form.body) {
        let reply = ordering::run_admin_command(&state, command).await;
        state
            .dispatcher()
            .reply(Channel::Sms, sender.as_str(), &reply)
            .await;
        return StatusCode::OK;
    }

    let result = ordering::place_order(
        &state,
        PlaceOrder {
            channel: Channel::Sms,
            customer_ref: sender.as_str().to_string(),
            // SMS carries no profile; the number stands in for the name.
            customer_name: sender.to_e164(),
            text: form.body,
            client_tag: None,
        },
    )
    .await;

    match result {
        Ok(Placement::Accepted(_) | Placement::Ignored) => {}
        Err(AppError::UnresolvedDrink(text)) => {
            let mut reply = format!("Sorry, we couldn't find \"{text}\" on the menu.");
            if let Some(hint) = state.dispatcher().menu_hint() {
                reply.push(' ');
                reply.push_str(&hint);
            }
            state
                .dispatcher()
                .reply(Channel::Sms, sender.as_str(), &reply)
                .await;
        }
        Err(AppError::OutOfStock(display_name)) => {
            let reply = format!("Sorry, we're out of {display_name} right now.");
            state
                .dispatcher()
                .reply(Channel::Sms, sender.as_str(), &reply)
                .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "order flow failed for inbound SMS");
        }
    }

    StatusCode::OK
}
