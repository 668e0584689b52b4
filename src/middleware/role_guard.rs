//! Role-based authorization guard.

use axum::{
    extract::{Extension, Request, State},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::middleware::auth_guard::AuthUser;
use crate::models::UserRole;
use crate::state::AppState;

/// Middleware: require the `admin` role.
///
/// The role is read from the store on every request, so a demotion takes
/// effect immediately. A failed lookup is treated the same as a non-admin.
pub async fn require_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let role: Option<UserRole> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(&user.user_id)
        .fetch_optional(&state.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, user_id = %user.user_id, "Admin lookup failed");
            None
        });

    if role != Some(UserRole::Admin) {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(req).await)
}
