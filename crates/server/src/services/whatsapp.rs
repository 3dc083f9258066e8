//! WhatsApp Cloud API client for outbound messages.
//!
//! Wraps the Graph API `/messages` endpoint: the bar replies to customers
//! and alerts operators through the same phone number id it receives
//! webhooks for.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::WhatsAppConfig;

/// Graph API base URL.
const BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Errors that can occur when sending through the Cloud API.
#[derive(Debug, Error)]
pub enum WhatsAppError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client.
    #[error("Client error: {0}")]
    Client(String),
}

/// WhatsApp Cloud API client.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    phone_number_id: String,
}

impl WhatsAppClient {
    /// Create a new Cloud API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, WhatsAppError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| WhatsAppError::Client(format!("Invalid access token format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            phone_number_id: config.phone_number_id.clone(),
        })
    }

    /// Send a plain text message to a phone number.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), WhatsAppError> {
        let url = format!("{BASE_URL}/{}/messages", self.phone_number_id);

        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "body": body }
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
