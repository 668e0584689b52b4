//! Authentication guard middleware.
//!
//! Reads a bearer token from the `Authorization` header (or, failing that,
//! the `token` cookie), validates it, and injects an `AuthUser` extension into
//! the request for downstream handlers. No store lookup happens here.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{auth::token::validate_token, errors::AppError, state::AppState};

pub const TOKEN_COOKIE: &str = "token";

/// Identity resolved from a valid token. Injected into request extensions by
/// `require_auth`; downstream handlers use `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// The header wins when both a header and a cookie are present.
pub fn extract_token(headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    from_header.or_else(|| {
        cookies
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|t| !t.is_empty())
    })
}

/// Middleware: require a valid token.
/// On success, inserts `AuthUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers(), &cookies).ok_or(AppError::Unauthorized)?;
    let claims = validate_token(&state.config.jwt_secret, &token)?;

    req.extensions_mut().insert(AuthUser { user_id: claims.user_id });

    Ok(next.run(req).await)
}
