//! Bearer token verification for workspace endpoints
//!
//! Tokens are HS256 JWTs minted by the identity service that shares the
//! signing secret. The `sub` claim identifies the workspace owner.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

/// Signing keys derived from the shared secret
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token for `user_id` valid for `ttl`
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String> {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)?
            .checked_add(ttl)
            .context("token expiry overflows")?
            .as_secs();
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign token")
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::Unauthorized {
                    error: "Token expired",
                    message: "Token has expired",
                },
                _ => invalid_token(),
            })
    }
}

/// The owner of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ServiceError::Unauthorized {
                error: "Access token required",
                message: "No token provided",
            })?;

        let claims = state.tokens.verify(token)?;
        if claims.sub.is_empty() {
            return Err(invalid_token());
        }

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

fn invalid_token() -> ServiceError {
    ServiceError::Unauthorized {
        error: "Invalid token",
        message: "Token is invalid",
    }
}
