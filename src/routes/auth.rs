use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_cookies::{
    cookie::{time::Duration as CookieDuration, SameSite},
    Cookie, Cookies,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        hash_password,
        token::{issue_token, lifetime_hours},
        verify_password,
    },
    errors::{AppError, AppJson, AppResult},
    middleware::auth_guard::{AuthUser, TOKEN_COOKIE},
    models::{Address, User, UserStatus, USER_COLUMNS},
    services::users::{self, NewUser},
    state::AppState,
};

// ── Request types ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    email:    String,
    password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    name:     String,
    #[serde(default)]
    address:  Option<Address>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email:       String,
    password:    String,
    #[serde(default, alias = "rememberMe")]
    remember_me: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password:     String,
}

// ── Router ────────────────────────────────────────────────────

/// Routes reachable without a token.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login",    post(login))
}

/// Routes that sit behind `require_auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout",          post(logout))
        .route("/auth/refresh",         post(refresh))
        .route("/auth/change-password", post(change_password))
}

// ── Handlers ──────────────────────────────────────────────────

/// POST /auth/register: create a `user` account and sign it in.
async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let pool   = &state.pool;
    let config = &state.config;

    body.validate()
        .map_err(|e| AppError::BadRequest(first_validation_message(&e)))?;
    config.password_policy.validate(&body.password)?;

    // Checked up front; `users::insert` still maps a lost race to 409.
    let email_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
        .bind(&body.email)
        .fetch_one(pool)
        .await?;
    if email_taken {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let hash    = hash_password(&body.password).await?;
    let id      = Uuid::new_v4().to_string();
    let address = body.address.unwrap_or_default();

    users::insert(pool, NewUser {
        id:            &id,
        email:         &body.email,
        password_hash: &hash,
        name:          body.name.trim(),
        address:       &address,
    })
    .await?;

    tracing::info!(user_id = %id, "User registered");

    let user  = users::find(&state.pool, &id).await?;
    let token = issue_token(&config.jwt_secret, &id, false)?;
    set_token_cookie(&state, &cookies, &token, false);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token":   token,
            "user":    user,
        })),
    ))
}

/// POST /auth/login: email + password. Banned accounts get their reason back.
async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&body.email)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    verify_password(&body.password, &user.password_hash).await?;

    match user.status {
        UserStatus::Active   => {}
        UserStatus::Banned   => {
            tracing::info!(user_id = %user.id, "Login refused for banned account");
            return Err(AppError::Banned(user.ban_reason.clone()));
        }
        UserStatus::Inactive => return Err(AppError::AccountInactive),
    }

    let token = issue_token(&state.config.jwt_secret, &user.id, body.remember_me)?;
    set_token_cookie(&state, &cookies, &token, body.remember_me);

    Ok(Json(json!({ "token": token, "user": user })))
}

/// POST /auth/logout: tokens are stateless; only the cookie is cleared.
async fn logout(cookies: Cookies) -> AppResult<impl IntoResponse> {
    let cookie = Cookie::build((TOKEN_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .build();
    cookies.add(cookie);
    Ok(Json(json!({ "message": "logged out successfully" })))
}

/// POST /auth/refresh: issue a fresh long-lived token for the caller.
async fn refresh(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let token = issue_token(&state.config.jwt_secret, &auth.user_id, true)?;
    set_token_cookie(&state, &cookies, &token, true);
    Ok(Json(json!({ "token": token })))
}

/// POST /auth/change-password: requires the current password.
async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(body): AppJson<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    let user = users::find(&state.pool, &auth.user_id).await?;

    verify_password(&body.current_password, &user.password_hash).await.map_err(|e| match e {
        AppError::InvalidCredentials => AppError::BadRequest("current password is incorrect".into()),
        other => other,
    })?;
    state.config.password_policy.validate(&body.new_password)?;

    let hash = hash_password(&body.new_password).await?;
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(hash)
        .bind(Utc::now())
        .bind(&user.id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

// ── Internal helpers ──────────────────────────────────────────

fn set_token_cookie(state: &AppState, cookies: &Cookies, token: &str, remember_me: bool) {
    let cookie = Cookie::build((TOKEN_COOKIE, token.to_owned()))
        .http_only(true)
        .secure(!state.config.is_development())
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(CookieDuration::hours(lifetime_hours(remember_me)))
        .build();
    cookies.add(cookie);
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".into())
}
