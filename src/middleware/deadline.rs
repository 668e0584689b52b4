//! Per-request deadline. Work still running when `REQUEST_TIMEOUT_SECS`
//! elapses is dropped and the caller gets a JSON 504.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{errors::AppError, state::AppState};

pub async fn request_deadline(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_owned();
    tokio::time::timeout(state.config.request_timeout, next.run(req))
        .await
        .map_err(|_| {
            tracing::warn!(%path, timeout = ?state.config.request_timeout, "Request deadline exceeded");
            AppError::Timeout
        })
}
