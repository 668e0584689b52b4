//! `/profile`: read and update the current authenticated user's profile.
//!
//! `GET /profile`: returns the sanitized user record
//! `PUT /profile`: self-service patch of name and address only

use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    errors::{AppError, AppJson, AppResult},
    middleware::auth_guard::AuthUser,
    models::Address,
    services::users,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

/// Fields a user may change on their own account. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
struct ProfilePatch {
    name:    Option<String>,
    address: Option<Address>,
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let user = users::find(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "user": user })))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(patch): AppJson<ProfilePatch>,
) -> AppResult<Json<Value>> {
    let pool = &state.pool;

    let name = match &patch.name {
        Some(name) if name.trim().is_empty() => {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        Some(name) => Some(name.trim()),
        None       => None,
    };

    let mut tx = pool.begin().await?;

    let affected = sqlx::query("UPDATE users SET updated_at = ? WHERE id = ?")
        .bind(Utc::now()).bind(&auth.user_id).execute(&mut *tx).await?.rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    if let Some(name) = name {
        sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name).bind(&auth.user_id).execute(&mut *tx).await?;
    }
    if let Some(address) = &patch.address {
        sqlx::query(
            "UPDATE users SET address_line = ?, city = ?, province = ?, zipcode = ?, country = ?,
                              lat = ?, lng = ?
             WHERE id = ?",
        )
        .bind(&address.address_line)
        .bind(&address.city)
        .bind(&address.province)
        .bind(&address.zipcode)
        .bind(&address.country)
        .bind(address.lat)
        .bind(address.lng)
        .bind(&auth.user_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    let user = users::find(pool, &auth.user_id).await?;
    Ok(Json(json!({ "message": "profile updated successfully", "user": user })))
}
