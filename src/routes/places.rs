//! Public place and location reads. Ratings are recomputed from reviews on every read.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    errors::AppResult,
    models::Location,
    services::places,
    state::AppState,
};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/places",      get(list_places))
        .route("/places/{id}", get(get_place))
        .route("/locations",   get(list_locations))
}

async fn list_places(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let places = places::list_with_ratings(&state.pool).await?;
    Ok(Json(json!({ "places": places })))
}

/// GET /places/{id}: external id first, then storage id.
async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let mut place = places::resolve(&state.pool, &id).await?;
    places::apply_rating(&state.pool, &mut place).await?;
    Ok(Json(json!({ "place": place })))
}

async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let locations: Vec<Location> = sqlx::query_as::<_, Location>(
        "SELECT location_id, name, description, category, lat, lng, address, phone, website
         FROM locations
         ORDER BY CAST(location_id AS INTEGER), location_id",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(json!({ "locations": locations })))
}
