//! Dashboard authentication: password login exchanged for a short-lived JWT.
//!
//! The dashboard is a single shared operator surface, so there are no user
//! accounts; one password grants an `admin` role token. Protected handlers
//! take the [`RequireAdmin`] extractor, which rejects the request with 401
//! before the handler body runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::state::AppState;

const TOKEN_LIFETIME_HOURS: i64 = 8;
const ADMIN_ROLE: &str = "admin";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

/// Claims stored in the dashboard token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Role granted by the login (always `admin` today)
    pub role: String,
    /// Expiry timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
}

/// Signs and verifies dashboard tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue an admin token valid for [`TOKEN_LIFETIME_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenGeneration` if signing fails.
    pub fn sign_admin(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            role: ADMIN_ROLE.to_string(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ExpiredToken` or `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })?;
        if data.claims.role != ADMIN_ROLE {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

/// Extractor that requires a valid admin bearer token.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected Bearer token".to_string()))?;

        let claims = state.jwt().verify(token)?;
        Ok(Self(claims))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6d"))
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let jwt = service();
        let token = jwt.sign_admin().unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let jwt = service();
        assert!(matches!(
            jwt.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = service().sign_admin().unwrap();
        let other = JwtService::new(&SecretString::from("zC6d!aB3$xY9mK2@nL5#pQ7&rT0*uW4^"));
        assert!(other.verify(&token).is_err());
    }
}
