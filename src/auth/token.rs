//! Bearer token issuance and validation (HS256 JWT).
//!
//! Validity is purely a function of signature and expiry; nothing is stored
//! server-side, so logout cannot revoke a token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const TOKEN_HOURS:       i64 = 24;
pub const REMEMBER_ME_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub exp:     i64,
    pub iat:     i64,
}

pub fn lifetime_hours(remember_me: bool) -> i64 {
    if remember_me { REMEMBER_ME_HOURS } else { TOKEN_HOURS }
}

pub fn issue_token(secret: &str, user_id: &str, remember_me: bool) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id: user_id.to_owned(),
        exp:     (now + Duration::hours(lifetime_hours(remember_me))).timestamp(),
        iat:     now.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to generate token: {e}")))
}

/// Any structural, signature, algorithm or expiry failure collapses to `Unauthorized`.
pub fn validate_token(secret: &str, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AppError::Unauthorized
        })
}
