use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::config::Config;
use crate::db::Db;
use crate::models::Location;

const BOOTSTRAP_DEADLINE: Duration = Duration::from_secs(30);

/// Reference locations, places and routes shipped with the binary.
const REFERENCE_DATA: &str = include_str!("../../seed/reference.json");

#[derive(Deserialize)]
struct ReferenceData {
    locations: Vec<Location>,
    places:    Vec<SeedPlace>,
    routes:    Vec<SeedRoute>,
}

#[derive(Deserialize)]
struct SeedPlace {
    id:               Option<String>,
    place_id:         String,
    name:             String,
    location_id:      String,
    description:      String,
    category:         String,
    cover_image:      String,
    highlight_images: Vec<String>,
    lat:              f64,
    lng:              f64,
    address:          String,
    phone:            String,
    website:          String,
    hours:            String,
}

#[derive(Deserialize)]
struct SeedRoute {
    start_loc_id:   String,
    end_loc_id:     String,
    distance:       f64,
    duration:       i64,
    cost:           f64,
    transport_mode: String,
}

/// Seeds the admin account and the reference data.
/// Safe to call on every startup: every row is checked before inserting.
pub async fn bootstrap(pool: &Db, config: &Config) -> anyhow::Result<()> {
    tokio::time::timeout(BOOTSTRAP_DEADLINE, async {
        seed_admin(pool, config).await?;
        seed_reference_data(pool).await?;
        backfill_place_ids(pool).await?;
        anyhow::Ok(())
    })
    .await
    .map_err(|_| anyhow::anyhow!("bootstrap did not finish within {BOOTSTRAP_DEADLINE:?}"))?
}

async fn seed_admin(pool: &Db, config: &Config) -> anyhow::Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
        .bind(&config.admin_email)
        .fetch_one(pool)
        .await?;
    if exists {
        return Ok(());
    }

    let hash = hash_password(&config.admin_password).await?;
    let now  = Utc::now();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'admin', 'active', ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&config.admin_email)
    .bind(hash)
    .bind(&config.admin_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(email = %config.admin_email, "Seeded admin account");
    Ok(())
}

async fn seed_reference_data(pool: &Db) -> anyhow::Result<()> {
    let data: ReferenceData = serde_json::from_str(REFERENCE_DATA)?;
    let now = Utc::now();

    let mut inserted = 0u64;
    for loc in &data.locations {
        inserted += sqlx::query(
            "INSERT OR IGNORE INTO locations
                 (location_id, name, description, category, lat, lng, address, phone, website)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&loc.location_id)
        .bind(&loc.name)
        .bind(&loc.description)
        .bind(&loc.category)
        .bind(loc.lat)
        .bind(loc.lng)
        .bind(&loc.address)
        .bind(&loc.phone)
        .bind(&loc.website)
        .execute(pool)
        .await?
        .rows_affected();
    }
    if inserted > 0 {
        tracing::info!(count = inserted, "Seeded locations");
    }

    let mut inserted = 0u64;
    for place in &data.places {
        inserted += sqlx::query(
            "INSERT OR IGNORE INTO places (id, place_id, name, location_id, description, category,
                                           cover_image, highlight_images, rating, lat, lng, address,
                                           phone, website, hours, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&place.id)
        .bind(&place.place_id)
        .bind(&place.name)
        .bind(&place.location_id)
        .bind(&place.description)
        .bind(&place.category)
        .bind(&place.cover_image)
        .bind(sqlx::types::Json(&place.highlight_images))
        .bind(place.lat)
        .bind(place.lng)
        .bind(&place.address)
        .bind(&place.phone)
        .bind(&place.website)
        .bind(&place.hours)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    }
    if inserted > 0 {
        tracing::info!(count = inserted, "Seeded places");
    }

    let mut inserted = 0u64;
    for route in &data.routes {
        inserted += sqlx::query(
            "INSERT OR IGNORE INTO routes (id, start_loc_id, end_loc_id, distance, duration, cost,
                                           transport_mode, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&route.start_loc_id)
        .bind(&route.end_loc_id)
        .bind(route.distance)
        .bind(route.duration)
        .bind(route.cost)
        .bind(&route.transport_mode)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    }
    if inserted > 0 {
        tracing::info!(count = inserted, "Seeded routes");
    }

    Ok(())
}

/// Give every place that only carries an external id a storage id. Rows that
/// already have one are never touched, so this runs at most once per row.
async fn backfill_place_ids(pool: &Db) -> anyhow::Result<()> {
    let pending: Vec<String> = sqlx::query_scalar("SELECT place_id FROM places WHERE id IS NULL")
        .fetch_all(pool)
        .await?;

    for place_id in &pending {
        sqlx::query("UPDATE places SET id = ? WHERE place_id = ? AND id IS NULL")
            .bind(Uuid::new_v4().to_string())
            .bind(place_id)
            .execute(pool)
            .await?;
    }
    if !pending.is_empty() {
        tracing::info!(count = pending.len(), "Assigned storage ids to places");
    }
    Ok(())
}
