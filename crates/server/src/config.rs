//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LASTCALL_DATABASE_URL` - `PostgreSQL` connection string
//! - `LASTCALL_JWT_SECRET` - Dashboard token signing secret (min 32 chars, high entropy)
//! - `LASTCALL_DASHBOARD_PASS` - Dashboard login password
//!
//! ## Optional
//! - `LASTCALL_HOST` - Bind address (default: 127.0.0.1)
//! - `LASTCALL_PORT` - Listen port (default: 3000)
//! - `LASTCALL_ADMIN_NUMBERS` - Comma-separated operator phone numbers
//! - `LASTCALL_ADMIN_OPEN_ACCESS` - Treat every sender as admin when the
//!   allow-list is empty (default: false; logged loudly when on)
//! - `LASTCALL_DRINKS_PATH` - Drink catalog JSON (default:
//!   crates/server/config/drinks.json)
//! - `WHATSAPP_PHONE_NUMBER_ID` / `WHATSAPP_ACCESS_TOKEN` /
//!   `WHATSAPP_VERIFY_TOKEN` - WhatsApp Cloud API (all three or none)
//! - `TWILIO_ACCOUNT_SID` / `TWILIO_AUTH_TOKEN` / `TWILIO_FROM_NUMBER` -
//!   Twilio SMS (all three or none)
//! - `PUSH_GATEWAY_URL` / `PUSH_GATEWAY_API_KEY` - Web push gateway
//! - `LASTCALL_MENU_URL` - Menu link included in customer replies
//! - `LASTCALL_SUPPORT_EMAIL` / `LASTCALL_SUPPORT_PHONE` - HELP reply contacts
//! - `LASTCALL_PRIVACY_URL` - Privacy link for the SMS HELP reply
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use lastcall_core::PhoneNumber;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Incomplete configuration for {0}: {1}")]
    IncompleteGroup(String, String),
}

/// Last Call application configuration.
#[derive(Debug, Clone)]
pub struct LastCallConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Dashboard token signing secret
    pub jwt_secret: SecretString,
    /// Dashboard login password
    pub dashboard_pass: SecretString,
    /// Operator phone allow-list (canonical form)
    pub admin_numbers: Vec<PhoneNumber>,
    /// Treat every sender as admin when the allow-list is empty
    pub admin_open_access: bool,
    /// Path to the drink catalog JSON
    pub drinks_path: PathBuf,
    /// WhatsApp Cloud API configuration, if enabled
    pub whatsapp: Option<WhatsAppConfig>,
    /// Twilio SMS configuration, if enabled
    pub twilio: Option<TwilioConfig>,
    /// Web push gateway configuration, if enabled
    pub push: Option<PushConfig>,
    /// Menu link included in customer replies
    pub menu_url: Option<String>,
    /// Contact details for the SMS HELP reply
    pub support: SupportConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// WhatsApp Cloud API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct WhatsAppConfig {
    /// Cloud API phone number id the bar sends from
    pub phone_number_id: String,
    /// Graph API access token
    pub access_token: SecretString,
    /// Webhook verification token echoed during subscription
    pub verify_token: String,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"[REDACTED]")
            .field("verify_token", &self.verify_token)
            .finish()
    }
}

/// Twilio SMS configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct TwilioConfig {
    /// Twilio account SID
    pub account_sid: String,
    /// Twilio auth token
    pub auth_token: SecretString,
    /// E.164 number messages are sent from
    pub from_number: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

/// Web push gateway configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct PushConfig {
    /// Gateway endpoint notifications are POSTed to
    pub gateway_url: String,
    /// Gateway API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Contact details surfaced in compliance replies.
#[derive(Debug, Clone, Default)]
pub struct SupportConfig {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub privacy_url: Option<String>,
}

impl LastCallConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("LASTCALL_DATABASE_URL")?;
        let host = get_env_or_default("LASTCALL_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LASTCALL_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LASTCALL_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LASTCALL_PORT".to_string(), e.to_string()))?;

        let jwt_secret = get_validated_secret("LASTCALL_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "LASTCALL_JWT_SECRET")?;
        let dashboard_pass = get_required_secret("LASTCALL_DASHBOARD_PASS")?;

        let admin_numbers = parse_admin_numbers(&get_env_or_default("LASTCALL_ADMIN_NUMBERS", ""))?;
        let admin_open_access = get_env_or_default("LASTCALL_ADMIN_OPEN_ACCESS", "false")
            .parse::<bool>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LASTCALL_ADMIN_OPEN_ACCESS".to_string(), e.to_string())
            })?;

        let drinks_path = PathBuf::from(get_env_or_default(
            "LASTCALL_DRINKS_PATH",
            "crates/server/config/drinks.json",
        ));

        let whatsapp = WhatsAppConfig::from_env()?;
        let twilio = TwilioConfig::from_env()?;
        let push = PushConfig::from_env()?;

        let support = SupportConfig {
            email: get_optional_env("LASTCALL_SUPPORT_EMAIL"),
            phone: get_optional_env("LASTCALL_SUPPORT_PHONE"),
            privacy_url: get_optional_env("LASTCALL_PRIVACY_URL"),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            dashboard_pass,
            admin_numbers,
            admin_open_access,
            drinks_path,
            whatsapp,
            twilio,
            push,
            menu_url: get_optional_env("LASTCALL_MENU_URL"),
            support,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl WhatsAppConfig {
    /// `None` when no WhatsApp variable is set; `Err` when only some are.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let phone_number_id = get_optional_env("WHATSAPP_PHONE_NUMBER_ID");
        let access_token = get_optional_env("WHATSAPP_ACCESS_TOKEN");
        let verify_token = get_optional_env("WHATSAPP_VERIFY_TOKEN");

        match (phone_number_id, access_token, verify_token) {
            (None, None, None) => Ok(None),
            (Some(phone_number_id), Some(access_token), Some(verify_token)) => Ok(Some(Self {
                phone_number_id,
                access_token: SecretString::from(access_token),
                verify_token,
            })),
            _ => Err(ConfigError::IncompleteGroup(
                "WhatsApp".to_string(),
                "set WHATSAPP_PHONE_NUMBER_ID, WHATSAPP_ACCESS_TOKEN and \
                 WHATSAPP_VERIFY_TOKEN together, or none of them"
                    .to_string(),
            )),
        }
    }
}

impl TwilioConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let account_sid = get_optional_env("TWILIO_ACCOUNT_SID");
        let auth_token = get_optional_env("TWILIO_AUTH_TOKEN");
        let from_number = get_optional_env("TWILIO_FROM_NUMBER");

        match (account_sid, auth_token, from_number) {
            (None, None, None) => Ok(None),
            (Some(account_sid), Some(auth_token), Some(from_number)) => Ok(Some(Self {
                account_sid,
                auth_token: SecretString::from(auth_token),
                from_number,
            })),
            _ => Err(ConfigError::IncompleteGroup(
                "Twilio".to_string(),
                "set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER \
                 together, or none of them"
                    .to_string(),
            )),
        }
    }
}

impl PushConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let gateway_url = get_optional_env("PUSH_GATEWAY_URL");
        let api_key = get_optional_env("PUSH_GATEWAY_API_KEY");

        match (gateway_url, api_key) {
            (None, None) => Ok(None),
            (Some(gateway_url), Some(api_key)) => Ok(Some(Self {
                gateway_url,
                api_key: SecretString::from(api_key),
            })),
            _ => Err(ConfigError::IncompleteGroup(
                "Push".to_string(),
                "set PUSH_GATEWAY_URL and PUSH_GATEWAY_API_KEY together, or neither".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the comma-separated operator allow-list into canonical phone numbers.
fn parse_admin_numbers(raw: &str) -> Result<Vec<PhoneNumber>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            PhoneNumber::normalize(s).map_err(|e| {
                ConfigError::InvalidEnvVar("LASTCALL_ADMIN_NUMBERS".to_string(), e.to_string())
            })
        })
        .collect()
}

/// Validate that the JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_jwt_secret(&secret, "TEST_JWT").is_err());
    }

    #[test]
    fn test_validate_jwt_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_jwt_secret(&secret, "TEST_JWT").is_ok());
    }

    #[test]
    fn test_parse_admin_numbers() {
        let numbers = parse_admin_numbers("+1 555 000 1111, 447911123456").unwrap();
        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[0].as_str(), "15550001111");
        assert_eq!(numbers[1].as_str(), "447911123456");

        assert!(parse_admin_numbers("").unwrap().is_empty());
        assert!(parse_admin_numbers("not-a-number").is_err());
    }

    #[test]
    fn test_whatsapp_config_debug_redacts_token() {
        let config = WhatsAppConfig {
            phone_number_id: "1234567890".to_string(),
            access_token: SecretString::from("super_secret_graph_token"),
            verify_token: "verify-me".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("1234567890"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_graph_token"));
    }
}
