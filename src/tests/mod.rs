//! HTTP-level tests driving the full router over an in-memory database.

mod admin_test;
mod places_test;
mod routes_test;

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt; // not axum::ServiceExt

use crate::{auth::PasswordPolicy, auth::seed, config::Config, db::{self, Db}, routes, state::AppState};

pub const ADMIN_EMAIL:    &str = "admin@test.local";
pub const ADMIN_PASSWORD: &str = "adminpass1";

pub fn test_config() -> Config {
    let upload_dir = std::env::temp_dir().join(format!("gosmooth-test-{}", uuid::Uuid::new_v4()));
    Config {
        database_url:       "sqlite::memory:".into(),
        db_max_connections: 1,
        backend_host:       "127.0.0.1".into(),
        backend_port:       0,
        cors_origin:        "http://localhost:5173".into(),
        request_timeout:    Duration::from_secs(10),
        jwt_secret:         "test-secret".into(),
        password_policy:    PasswordPolicy::Basic,
        admin_email:        ADMIN_EMAIL.into(),
        admin_password:     ADMIN_PASSWORD.into(),
        admin_name:         "Admin".into(),
        upload_dir:         upload_dir.to_string_lossy().into_owned(),
        app_env:            "development".into(),
    }
}

/// Fresh app over its own in-memory database, migrated and seeded.
pub async fn test_app() -> Router {
    test_env(test_config()).await.0
}

/// Like [`test_app`] but with a custom config, also handing back the pool.
pub async fn test_env(config: Config) -> (Router, Db) {
    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(&config.database_url)
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    seed::bootstrap(&pool, &config).await.unwrap();

    (routes::app(AppState { pool: pool.clone(), config }), pool)
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

/// Send a prebuilt request. Bodies that are not JSON decode to `Value::Null`.
pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Register a user and return `(token, user_id)`.
pub async fn register(app: &Router, email: &str, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(serde_json::json!({ "email": email, "password": "secret12", "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["token"].as_str().unwrap().to_owned(),
        body["user"]["id"].as_str().unwrap().to_owned(),
    )
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await
}

pub async fn admin_token(app: &Router) -> String {
    let (status, body) = login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().unwrap().to_owned()
}
