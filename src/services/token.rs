//! Signed access tokens (HS256 JWT).

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::config::SecurityConfig;
use crate::constants::auth::GENERATED_SECRET_BYTES;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed")]
    Malformed,

    #[error("Failed to sign token: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Login of the authenticated user.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            sub: subject.into(),
            iat: now,
            exp: now.saturating_add(ttl),
        }
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.exp
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Uses the configured secret, or a random one that lives as long as the
    /// process.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        let ttl = Duration::from_secs(config.access_token_ttl_minutes.saturating_mul(60));

        if config.jwt_secret.is_empty() {
            warn!("No JWT secret configured; generated a random one, tokens will not survive a restart");
            return Self::new(&generate_secret(), ttl);
        }

        Self::new(config.jwt_secret.as_bytes(), ttl)
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `subject` valid for the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, self.ttl)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.sign(&Claims::new(subject, ttl))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Checks the signature and that the current time is strictly before `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if claims.expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn generate_secret() -> [u8; GENERATED_SECRET_BYTES] {
    use rand::Rng;

    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    rand::rng().fill(&mut bytes);
    bytes
}
