//! `/reviews` routes: reviews plus their comment threads and moderation reports.
//!
//! Any authenticated user may update, delete or comment on any review; there
//! is no ownership check on these operations.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppJson, AppQuery, AppResult},
    middleware::auth_guard::AuthUser,
    routes::parse_id,
    services::{places, reviews, users},
    state::AppState,
};

const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/reviews", get(list_reviews))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews",                                  post(create_review))
        .route("/reviews/{id}",                             get(get_review).put(update_review).delete(delete_review))
        .route("/reviews/{id}/like",                        post(like_review))
        .route("/reviews/{id}/comments",                    post(add_comment))
        .route("/reviews/{id}/comments/{comment_id}/like",  post(like_comment))
        .route("/reviews/{id}/report",                      post(report_review))
}

// ── Request bodies ───────────────────────────────────────────

#[derive(Deserialize)]
struct ReviewFilter {
    #[serde(rename = "placeId")]
    place_id: Option<String>,
}

#[derive(Deserialize)]
struct CreateReviewBody {
    #[serde(rename = "placeId", alias = "place_id")]
    place_id:   String,
    #[serde(rename = "placeName", alias = "place_name", default)]
    place_name: Option<String>,
    rating:     i64,
    #[serde(default)]
    comment:    String,
}

/// Only rating and comment text can change after creation.
#[derive(Deserialize, Default)]
struct ReviewPatch {
    rating:  Option<i64>,
    comment: Option<String>,
}

#[derive(Deserialize)]
struct CommentBody {
    text: String,
}

#[derive(Deserialize)]
struct ReportBody {
    #[serde(rename = "type", default)]
    kind:   String,
    #[serde(default)]
    detail: String,
}

fn validate_rating(rating: i64) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::BadRequest(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /reviews?placeId=: reviews without a cached place name get one from
/// the current place list.
async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ReviewFilter>,
) -> AppResult<Json<Value>> {
    let pool = &state.pool;
    let place_id = filter.place_id.as_deref().filter(|p| !p.is_empty());
    let mut list = reviews::list(pool, place_id).await?;

    if list.iter().any(|r| r.place_name.is_empty()) {
        let names: HashMap<String, String> =
            sqlx::query_as::<_, (String, String)>("SELECT place_id, name FROM places")
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect();
        for review in list.iter_mut().filter(|r| r.place_name.is_empty()) {
            if let Some(name) = names.get(&review.place_id) {
                review.place_name = name.clone();
            }
        }
    }

    Ok(Json(json!({ "reviews": list })))
}

/// POST /reviews: the caller's name and the place name are cached on the review.
async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(body): AppJson<CreateReviewBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let pool = &state.pool;

    if body.place_id.trim().is_empty() {
        return Err(AppError::BadRequest("placeId is required".into()));
    }
    validate_rating(body.rating)?;

    let user = users::find(pool, &auth.user_id).await.map_err(|e| match e {
        AppError::NotFound => AppError::Unauthorized,
        other => other,
    })?;

    // A failed place lookup leaves the name empty rather than failing the request.
    let place_name = match body.place_name.filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => match places::resolve(pool, &body.place_id).await {
            Ok(place) => place.name,
            Err(e) => {
                tracing::debug!(place_id = %body.place_id, error = %e, "Place name lookup failed");
                String::new()
            }
        },
    };

    let id  = Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO reviews (id, user_id, username, place_id, place_name, rating, comment, likes,
                              created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(&user.id)
    .bind(&user.name)
    .bind(&body.place_id)
    .bind(&place_name)
    .bind(body.rating)
    .bind(&body.comment)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(review_id = %id, place_id = %body.place_id, "Review created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message":   "review created successfully",
            "id":        id,
            "placeName": place_name,
        })),
    ))
}

async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "review")?;
    let review = reviews::load(&state.pool, &id).await?;
    Ok(Json(json!({ "review": review })))
}

async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<ReviewPatch>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "review")?;
    let pool = &state.pool;

    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
    }

    // Applied as one unit.
    let mut tx = pool.begin().await?;

    let affected = sqlx::query("UPDATE reviews SET updated_at = ? WHERE id = ?")
        .bind(Utc::now()).bind(&id).execute(&mut *tx).await?.rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    if let Some(rating) = patch.rating {
        sqlx::query("UPDATE reviews SET rating = ? WHERE id = ?")
            .bind(rating).bind(&id).execute(&mut *tx).await?;
    }
    if let Some(comment) = &patch.comment {
        sqlx::query("UPDATE reviews SET comment = ? WHERE id = ?")
            .bind(comment).bind(&id).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    Ok(Json(json!({ "message": "review updated successfully" })))
}

async fn delete_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "review")?;
    let affected = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(&id).execute(&state.pool).await?.rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    tracing::info!(review_id = %id, by = %auth.user_id, "Review deleted");
    Ok(Json(json!({ "message": "review deleted successfully" })))
}

/// POST /reviews/{id}/like: toggles the caller's like.
async fn like_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "review")?;
    let outcome = reviews::toggle_review_like(&state.pool, &id, &auth.user_id).await?;
    Ok(Json(json!({
        "message": "like toggled",
        "liked":   outcome.liked,
        "likes":   outcome.likes,
    })))
}

async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(body): AppJson<CommentBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let id = parse_id(&id, "review")?;
    let pool = &state.pool;

    let text = body.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("text is required".into()));
    }

    let user = users::find(pool, &auth.user_id).await.map_err(|e| match e {
        AppError::NotFound => AppError::Unauthorized,
        other => other,
    })?;

    let comment = reviews::append_comment(pool, &id, &user.id, &user.name, text).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "comment added", "comment": comment })),
    ))
}

/// POST /reviews/{id}/comments/{comment_id}/like: toggles the caller's like on one comment.
async fn like_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, comment_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let id         = parse_id(&id, "review")?;
    let comment_id = parse_id(&comment_id, "comment")?;
    let outcome = reviews::toggle_comment_like(&state.pool, &id, &comment_id, &auth.user_id).await?;
    Ok(Json(json!({
        "message": "like toggled",
        "liked":   outcome.liked,
        "likes":   outcome.likes,
    })))
}

/// POST /reviews/{id}/report: flag a review for moderation.
async fn report_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(body): AppJson<ReportBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let id = parse_id(&id, "review")?;
    let pool = &state.pool;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = ?)")
        .bind(&id).fetch_one(pool).await?;
    if !exists { return Err(AppError::NotFound); }

    let report_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO review_reports (id, review_id, reporter_id, type, detail, status, created_at)
         VALUES (?, ?, ?, ?, ?, 'pending', ?)",
    )
    .bind(&report_id)
    .bind(&id)
    .bind(&auth.user_id)
    .bind(&body.kind)
    .bind(&body.detail)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::info!(report_id = %report_id, review_id = %id, "Review reported");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "review reported", "id": report_id })),
    ))
}
