//! Caller identity resolution.
//!
//! Callers present `Authorization: Bearer <jwt>`; the token is verified with
//! the shared HS256 secret and its `sub` claim becomes the user id.

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lifetime of minted tokens: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user id must not be empty")]
    EmptySubject,

    #[error("token lifetime of {0}s is out of range")]
    InvalidTtl(i64),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// The caller's user id, or `None` when no identity can be established.
    async fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: &str, ttl_secs: i64) -> Result<String, AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::EmptySubject);
        }
        let now = Utc::now();
        let exp = Duration::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(AuthError::InvalidTtl(ttl_secs))?;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        Ok(decode::<TokenClaims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[async_trait]
impl IdentityResolver for JwtAuth {
    async fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        let token = bearer_token(headers)?;
        match self.verify(token) {
            Ok(claims) if !claims.sub.is_empty() => Some(claims.sub),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("rejected bearer token: {}", e);
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
