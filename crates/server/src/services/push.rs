//! Web push gateway client.
//!
//! The server does not speak the Web Push protocol itself; it hands the
//! stored subscription plus a title/body to a gateway that does. The one
//! piece of protocol awareness here is staleness: when the gateway reports
//! the subscription gone, the caller deletes the stored row.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::PushConfig;

/// Errors that can occur when delivering a push notification.
#[derive(Debug, Error)]
pub enum PushError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The subscription is gone; the stored row should be deleted.
    #[error("Stale subscription: {status}")]
    StaleSubscription { status: u16 },

    /// Gateway returned an error response.
    #[error("Gateway error: {status} - {message}")]
    Gateway { status: u16, message: String },
}

impl PushError {
    /// Whether the stored subscription should be dropped.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleSubscription { .. })
    }
}

/// Push gateway client.
#[derive(Clone)]
pub struct PushClient {
    client: reqwest::Client,
    gateway_url: String,
    api_key: SecretString,
}

impl PushClient {
    /// Create a new push gateway client.
    #[must_use]
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url: config.gateway_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Deliver a notification to a stored subscription.
    ///
    /// # Errors
    ///
    /// Returns `PushError::StaleSubscription` when the gateway reports the
    /// subscription gone (401/403/404/410), `PushError::Gateway` for other
    /// failures.
    pub async fn notify(
        &self,
        subscription: &serde_json::Value,
        title: &str,
        body: &str,
    ) -> Result<(), PushError> {
        let payload = serde_json::json!({
            "subscription": subscription,
            "notification": { "title": title, "body": body }
        });

        let response = self
            .client
            .post(&self.gateway_url)
            .header("X-Api-Key", self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status {
            StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::GONE => Err(PushError::StaleSubscription {
                status: status.as_u16(),
            }),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(PushError::Gateway {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
