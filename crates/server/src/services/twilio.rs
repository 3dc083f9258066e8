//! Twilio client for outbound SMS.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::TwilioConfig;

/// Twilio REST API base URL.
const BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Errors that can occur when sending SMS through Twilio.
#[derive(Debug, Error)]
pub enum TwilioError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Twilio SMS client.
#[derive(Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl TwilioClient {
    /// Create a new Twilio client.
    #[must_use]
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        }
    }

    /// Send an SMS to a phone number.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), TwilioError> {
        let url = format!("{BASE_URL}/Accounts/{}/Messages.json", self.account_sid);

        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&params)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
