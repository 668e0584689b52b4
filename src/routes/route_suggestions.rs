//! `/routes` endpoints: user-submitted route suggestions and the cost lookup
//! over seeded inter-location routes.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppJson, AppQuery, AppResult},
    middleware::auth_guard::AuthUser,
    models::{Route, RouteSuggestion},
    routes::parse_id,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/routes/suggest",          post(create_suggestion))
        .route("/routes/suggestions",      get(list_suggestions))
        .route("/routes/suggestions/{id}", get(get_suggestion).put(update_suggestion).delete(delete_suggestion))
        .route("/routes/cost",             get(estimate_cost))
}

const SUGGESTION_COLUMNS: &str =
    "id, user_id, start_location, end_location, description, created_at, updated_at";

#[derive(Deserialize)]
struct SuggestionBody {
    start_location: String,
    end_location:   String,
    #[serde(default)]
    description:    String,
}

impl SuggestionBody {
    fn validate(&self) -> AppResult<()> {
        if self.start_location.trim().is_empty() || self.end_location.trim().is_empty() {
            return Err(AppError::BadRequest(
                "start_location and end_location are required".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct CostQuery {
    start_location: String,
    end_location:   String,
    #[serde(default)]
    distance:       Option<f64>,
    #[serde(default)]
    duration:       Option<i64>,
}

/// Cheapest fare among the candidate routes, if any.
fn cheapest(routes: &[Route]) -> Option<f64> {
    routes.iter().map(|r| r.cost).reduce(f64::min)
}

async fn create_suggestion(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(body): AppJson<SuggestionBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;

    let id  = Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO route_suggestions
             (id, user_id, start_location, end_location, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&auth.user_id)
    .bind(body.start_location.trim())
    .bind(body.end_location.trim())
    .bind(&body.description)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    tracing::info!(suggestion_id = %id, user_id = %auth.user_id, "Route suggestion saved");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "route suggestion saved successfully", "id": id })),
    ))
}

async fn list_suggestions(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let sql = format!("SELECT {SUGGESTION_COLUMNS} FROM route_suggestions ORDER BY created_at DESC");
    let suggestions = sqlx::query_as::<_, RouteSuggestion>(&sql)
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}

async fn get_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "route suggestion")?;
    let sql = format!("SELECT {SUGGESTION_COLUMNS} FROM route_suggestions WHERE id = ?");
    let suggestion = sqlx::query_as::<_, RouteSuggestion>(&sql)
        .bind(&id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(json!({ "suggestion": suggestion })))
}

/// PUT replaces all three text fields. Any authenticated caller may edit any suggestion.
async fn update_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<SuggestionBody>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "route suggestion")?;
    body.validate()?;

    let affected = sqlx::query(
        "UPDATE route_suggestions
         SET start_location = ?, end_location = ?, description = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(body.start_location.trim())
    .bind(body.end_location.trim())
    .bind(&body.description)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.pool)
    .await?
    .rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    Ok(Json(json!({ "message": "route suggestion updated successfully" })))
}

async fn delete_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, "route suggestion")?;
    let affected = sqlx::query("DELETE FROM route_suggestions WHERE id = ?")
        .bind(&id)
        .execute(&state.pool)
        .await?
        .rows_affected();
    if affected == 0 { return Err(AppError::NotFound); }

    Ok(Json(json!({ "message": "route suggestion deleted successfully" })))
}

/// GET /routes/cost?start_location=&end_location=&distance=&duration=
async fn estimate_cost(
    State(state): State<AppState>,
    AppQuery(input): AppQuery<CostQuery>,
) -> AppResult<Json<Value>> {
    if input.start_location.trim().is_empty() || input.end_location.trim().is_empty() {
        return Err(AppError::BadRequest(
            "start_location and end_location are required".into(),
        ));
    }

    let routes: Vec<Route> = sqlx::query_as::<_, Route>(
        "SELECT id, start_loc_id, end_loc_id, distance, duration, cost, transport_mode,
                created_at, updated_at
         FROM routes
         WHERE start_loc_id = ? AND end_loc_id = ?
         ORDER BY cost",
    )
    .bind(input.start_location.trim())
    .bind(input.end_location.trim())
    .fetch_all(&state.pool)
    .await?;

    let estimated_cost = cheapest(&routes);
    Ok(Json(json!({
        "input":          input,
        "routes":         routes,
        "estimated_cost": estimated_cost,
    })))
}
