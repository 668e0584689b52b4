use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    middleware::{auth_guard::require_auth, deadline::request_deadline, role_guard::require_admin},
    state::AppState,
};

mod admin;
mod auth;
mod images;
mod places;
mod reviews;
mod route_suggestions;
mod users;

/// Build the full `/api` router.
///
/// Public read routes and register/login are left unprotected; every other
/// route is wrapped in [`require_auth`], and the admin subtree additionally
/// in [`require_admin`].
pub fn api_routes(state: AppState) -> Router<AppState> {
    let auth_mw  = middleware::from_fn_with_state(state.clone(), require_auth);
    let admin_mw = middleware::from_fn_with_state(state, require_admin);

    Router::new()
        .merge(auth::public_router())
        .merge(places::public_router())
        .merge(reviews::public_router())
        .merge(
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .merge(reviews::router())
                .merge(route_suggestions::router())
                .merge(
                    Router::new()
                        .merge(admin::router())
                        .merge(images::router())
                        .route_layer(admin_mw),
                )
                .route_layer(auth_mw),
        )
}

/// The whole application: API, uploaded files, and the cross-cutting layers.
pub fn app(state: AppState) -> Router {
    let config   = &state.config;
    let deadline = middleware::from_fn_with_state(state.clone(), request_deadline);

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_RANGE])
        .allow_credentials(true);

    Router::new()
        .nest("/api", api_routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(deadline)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse a storage identifier from a path segment.
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| AppError::BadRequest(format!("invalid {what} ID")))
}
