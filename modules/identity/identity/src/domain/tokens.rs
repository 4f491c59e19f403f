//! HS256 bearer tokens whose subject is a user id.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("token rejected: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user_id` valid for the configured ttl.
    ///
    /// # Errors
    /// Returns [`TokenError`] if signing fails.
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    ///
    /// # Errors
    /// Returns [`TokenError`] if signing fails.
    pub fn issue_at(&self, user_id: &str, issued_at: OffsetDateTime) -> Result<String, TokenError> {
        let iat = issued_at.unix_timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_owned(),
            iat,
            exp: iat.saturating_add(ttl),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry and return the claims.
    ///
    /// # Errors
    /// Returns [`TokenError`] for malformed, tampered or expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

/// Accepts `Bearer <token>` as well as a bare token.
#[must_use]
pub fn strip_bearer(raw: &str) -> &str {
    let raw = raw.trim_start();
    raw.strip_prefix("Bearer ").unwrap_or(raw).trim()
}
