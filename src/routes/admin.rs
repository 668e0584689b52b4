//! `/admin` routes: user management, place management, stats and review
//! report moderation.
//! Every route here sits behind `require_admin` (applied in `api_routes`).

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppJson, AppQuery, AppResult},
    middleware::auth_guard::AuthUser,
    models::{Coordinates, ReportStatus, ReviewReport, UserRole, UserStatus},
    routes::parse_id,
    services::{places, users},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users",                      get(list_users))
        .route("/admin/users/{id}",                 get(get_user).put(update_user).delete(delete_user))
        .route("/admin/users/{id}/ban",             post(ban_user))
        .route("/admin/users/{id}/unban",           post(unban_user))
        .route("/admin/places",                     get(list_places).post(create_place))
        .route("/admin/places/{id}",                put(update_place).delete(delete_place))
        .route("/admin/stats",                      get(stats))
        .route("/admin/review-reports",             get(list_reports))
        .route("/admin/review-reports/{id}/status", patch(update_report_status))
}

// ── Request bodies ───────────────────────────────────────────

/// Admin-side user patch. Absent fields are left untouched.
#[derive(Deserialize)]
struct UserPatch {
    name:       Option<String>,
    role:       Option<UserRole>,
    status:     Option<UserStatus>,
    ban_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct BanBody {
    #[serde(default)]
    reason: String,
}

/// Place payload shared by create and update. Keys follow the PascalCase wire
/// shape; snake_case spellings are accepted too.
#[derive(Deserialize)]
struct PlaceBody {
    #[serde(rename = "PlaceID", alias = "place_id", default)]
    place_id:         Option<String>,
    #[serde(rename = "Name", alias = "name")]
    name:             String,
    #[serde(rename = "LocationID", alias = "location_id")]
    location_id:      String,
    #[serde(rename = "Description", alias = "description", default)]
    description:      String,
    #[serde(rename = "Category", alias = "category", default)]
    category:         String,
    #[serde(rename = "CoverImage", alias = "cover_image", default)]
    cover_image:      String,
    #[serde(rename = "HighlightImages", alias = "highlight_images", alias = "Highlights", default)]
    highlight_images: Vec<String>,
    #[serde(rename = "Coordinates", alias = "coordinates", default)]
    coordinates:      Coordinates,
    #[serde(rename = "Address", alias = "address", default)]
    address:          String,
    #[serde(rename = "Phone", alias = "phone", default)]
    phone:            String,
    #[serde(rename = "Website", alias = "website", default)]
    website:          String,
    #[serde(rename = "Hours", alias = "hours", default)]
    hours:            String,
}

impl PlaceBody {
    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        if self.location_id.trim().is_empty() {
            return Err(AppError::BadRequest("LocationID is required".into()));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ReportFilter {
    status: Option<String>,
}

#[derive(Deserialize)]
struct ReportStatusBody {
    status: ReportStatus,
}

// ── Users ────────────────────────────────────────────────────

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let users = users::list(&state.pool).await?;
    Ok(Json(json!({ "users": users })))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "user")?;
    let user = users::find(&state.pool, &id).await?;
    Ok(Json(json!({ "user": user })))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<UserPatch>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "user")?;
    if patch.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name is required".into()));
    }

    let mut tx = state.pool.begin().await?;

    let affected = sqlx::query("UPDATE users SET updated_at = ? WHERE id = ?")
        .bind(Utc::now()).bind(&id).execute(&mut *tx).await?.rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    if let Some(name) = &patch.name {
        sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name.trim()).bind(&id).execute(&mut *tx).await?;
    }
    if let Some(role) = &patch.role {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str()).bind(&id).execute(&mut *tx).await?;
    }
    if let Some(status) = &patch.status {
        sqlx::query("UPDATE users SET status = ? WHERE id = ?")
            .bind(status.as_str()).bind(&id).execute(&mut *tx).await?;
    }
    if let Some(reason) = &patch.ban_reason {
        sqlx::query("UPDATE users SET ban_reason = ? WHERE id = ?")
            .bind(reason).bind(&id).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = %id, "User updated by admin");
    Ok(Json(json!({ "message": "user updated successfully" })))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "user")?;
    if id == auth.user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }

    let affected = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id).execute(&state.pool).await?.rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    tracing::info!(user_id = %id, by = %auth.user_id, "User deleted");
    Ok(Json(json!({ "message": "user deleted successfully" })))
}

async fn ban_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<BanBody>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "user")?;
    let affected = sqlx::query(
        "UPDATE users SET status = 'banned', ban_reason = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&body.reason)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.pool)
    .await?
    .rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    tracing::info!(user_id = %id, reason = %body.reason, "User banned");
    Ok(Json(json!({ "message": "user banned" })))
}

async fn unban_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "user")?;
    let affected = sqlx::query(
        "UPDATE users SET status = 'active', ban_reason = NULL, updated_at = ? WHERE id = ?",
    )
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.pool)
    .await?
    .rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    tracing::info!(user_id = %id, "User unbanned");
    Ok(Json(json!({ "message": "user unbanned" })))
}

// ── Places ───────────────────────────────────────────────────

async fn list_places(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let places = places::list_with_ratings(&state.pool).await?;
    Ok(Json(json!({ "places": places })))
}

/// POST /admin/places: the external id defaults to the new storage id.
async fn create_place(
    State(state): State<AppState>,
    AppJson(body): AppJson<PlaceBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;
    let pool = &state.pool;

    let id = Uuid::new_v4().to_string();
    let place_id = body
        .place_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| id.clone());
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO places (id, place_id, name, location_id, description, category, cover_image,
                             highlight_images, rating, lat, lng, address, phone, website, hours,
                             created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&place_id)
    .bind(body.name.trim())
    .bind(body.location_id.trim())
    .bind(&body.description)
    .bind(&body.category)
    .bind(&body.cover_image)
    .bind(SqlJson(&body.highlight_images))
    .bind(body.coordinates.lat)
    .bind(body.coordinates.lng)
    .bind(&body.address)
    .bind(&body.phone)
    .bind(&body.website)
    .bind(&body.hours)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict("PlaceID already exists".into()),
        other => other,
    })?;

    let place = places::resolve(pool, &place_id).await?;
    tracing::info!(place_id = %place_id, "Place created");
    Ok((StatusCode::CREATED, Json(json!({ "place": place }))))
}

/// PUT /admin/places/{id}: replaces every editable field; the external id is kept.
async fn update_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<PlaceBody>,
) -> AppResult<Json<Value>> {
    body.validate()?;
    let pool = &state.pool;
    let place = places::resolve(pool, &id).await?;

    sqlx::query(
        "UPDATE places
         SET name = ?, location_id = ?, description = ?, category = ?, cover_image = ?,
             highlight_images = ?, lat = ?, lng = ?, address = ?, phone = ?, website = ?,
             hours = ?, updated_at = ?
         WHERE place_id = ?",
    )
    .bind(body.name.trim())
    .bind(body.location_id.trim())
    .bind(&body.description)
    .bind(&body.category)
    .bind(&body.cover_image)
    .bind(SqlJson(&body.highlight_images))
    .bind(body.coordinates.lat)
    .bind(body.coordinates.lng)
    .bind(&body.address)
    .bind(&body.phone)
    .bind(&body.website)
    .bind(&body.hours)
    .bind(Utc::now())
    .bind(&place.place_id)
    .execute(pool)
    .await?;

    tracing::info!(place_id = %place.place_id, "Place updated");
    Ok(Json(json!({ "message": "place updated successfully" })))
}

/// Reviews keyed on the deleted place are left in place.
async fn delete_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let pool = &state.pool;
    let place = places::resolve(pool, &id).await?;

    sqlx::query("DELETE FROM places WHERE place_id = ?")
        .bind(&place.place_id)
        .execute(pool)
        .await?;

    tracing::info!(place_id = %place.place_id, "Place deleted");
    Ok(Json(json!({ "message": "place deleted successfully" })))
}

// ── Stats ────────────────────────────────────────────────────

/// `total_routes` counts user route suggestions, not seeded routes.
async fn stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let pool = &state.pool;
    let total_users: i64   = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
    let total_reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews").fetch_one(pool).await?;
    let total_routes: i64  = sqlx::query_scalar("SELECT COUNT(*) FROM route_suggestions").fetch_one(pool).await?;

    Ok(Json(json!({
        "total_users":   total_users,
        "total_reviews": total_reviews,
        "total_routes":  total_routes,
        "last_updated":  Utc::now(),
    })))
}

// ── Review reports ───────────────────────────────────────────

const REPORT_COLUMNS: &str =
    "id, review_id, reporter_id, type, detail, status, created_at, resolved_at";

async fn list_reports(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ReportFilter>,
) -> AppResult<Json<Value>> {
    let pool = &state.pool;
    let reports: Vec<ReviewReport> = match filter.status.filter(|s| !s.is_empty()) {
        Some(status) => {
            let sql = format!(
                "SELECT {REPORT_COLUMNS} FROM review_reports WHERE status = ? ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, ReviewReport>(&sql).bind(status).fetch_all(pool).await?
        }
        None => {
            let sql = format!("SELECT {REPORT_COLUMNS} FROM review_reports ORDER BY created_at DESC");
            sqlx::query_as::<_, ReviewReport>(&sql).fetch_all(pool).await?
        }
    };
    Ok(Json(json!({ "reports": reports })))
}

async fn update_report_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<ReportStatusBody>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "report")?;
    let affected = sqlx::query("UPDATE review_reports SET status = ?, resolved_at = ? WHERE id = ?")
        .bind(&body.status)
        .bind(Utc::now())
        .bind(&id)
        .execute(&state.pool)
        .await?
        .rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    tracing::info!(report_id = %id, status = ?body.status, "Review report status updated");
    Ok(Json(json!({ "message": "report status updated" })))
}
