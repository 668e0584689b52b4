//! Persisted entities and their JSON shapes.
//!
//! Field names on the wire follow what the frontend already consumes: places
//! and locations use PascalCase keys, everything else snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;

// ── Users ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self { UserRole::User => "user", UserRole::Admin => "admin" }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle flag. Anything stored other than `active`/`banned`
/// reads back as `Inactive` and blocks login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Banned,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active   => "active",
            UserStatus::Banned   => "banned",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl From<String> for UserStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => UserStatus::Active,
            "banned" => UserStatus::Banned,
            _        => UserStatus::Inactive,
        }
    }
}

/// Postal address; stored as flat columns on the `users` row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Address {
    #[serde(rename = "addressLine", default, skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city:         Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode:      Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country:      Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat:          Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng:          Option<f64>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        *self == Address::default()
    }
}

/// A user account. The password hash is loaded for credential checks but is
/// never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id:            String,
    pub email:         String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name:          String,
    pub role:          UserRole,
    #[sqlx(try_from = "String")]
    pub status:        UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason:    Option<String>,
    #[sqlx(flatten)]
    #[serde(skip_serializing_if = "Address::is_empty")]
    pub address:       Address,
    pub created_at:    DateTime<Utc>,
    pub updated_at:    DateTime<Utc>,
}

pub const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, status, ban_reason, address_line, city, province, \
     zipcode, country, lat, lng, created_at, updated_at";

// ── Places & locations ───────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A point of interest. `place_id` is the external key used in URLs and by
/// reviews; `id` is the storage identifier.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Place {
    #[serde(rename = "_id")]
    pub id:               Option<String>,
    #[serde(rename = "PlaceID")]
    pub place_id:         String,
    #[serde(rename = "Name")]
    pub name:             String,
    #[serde(rename = "LocationID")]
    pub location_id:      String,
    #[serde(rename = "Description")]
    pub description:      String,
    #[serde(rename = "Category")]
    pub category:         String,
    #[serde(rename = "CoverImage")]
    pub cover_image:      String,
    #[serde(rename = "HighlightImages")]
    pub highlight_images: SqlJson<Vec<String>>,
    /// Derived: mean review rating, recomputed on every read.
    #[serde(rename = "Rating")]
    pub rating:           f64,
    #[sqlx(flatten)]
    #[serde(rename = "Coordinates")]
    pub coordinates:      Coordinates,
    #[serde(rename = "Address")]
    pub address:          String,
    #[serde(rename = "Phone")]
    pub phone:            String,
    #[serde(rename = "Website")]
    pub website:          String,
    #[serde(rename = "Hours")]
    pub hours:            String,
    #[serde(rename = "CreatedAt")]
    pub created_at:       DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at:       DateTime<Utc>,
}

pub const PLACE_COLUMNS: &str =
    "id, place_id, name, location_id, description, category, cover_image, highlight_images, \
     rating, lat, lng, address, phone, website, hours, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    #[serde(rename = "LocationID")]
    pub location_id: String,
    #[serde(rename = "Name")]
    pub name:        String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Category", default, skip_serializing_if = "Option::is_none")]
    pub category:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat:         Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng:         Option<f64>,
    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address:     Option<String>,
    #[serde(rename = "Phone", default, skip_serializing_if = "Option::is_none")]
    pub phone:       Option<String>,
    #[serde(rename = "Website", default, skip_serializing_if = "Option::is_none")]
    pub website:     Option<String>,
}

/// A seeded connection between two locations.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Route {
    pub id:             String,
    #[serde(rename = "StartLocID")]
    pub start_loc_id:   String,
    #[serde(rename = "EndLocID")]
    pub end_loc_id:     String,
    #[serde(rename = "Distance")]
    pub distance:       f64,
    #[serde(rename = "Duration")]
    pub duration:       i64,
    #[serde(rename = "Cost")]
    pub cost:           f64,
    #[serde(rename = "TransportMode")]
    pub transport_mode: String,
    #[serde(rename = "CreatedAt")]
    pub created_at:     DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at:     DateTime<Utc>,
}

// ── Reviews ──────────────────────────────────────────────────

/// A review with its like set and comment thread.
///
/// `username` and `place_name` are denormalized copies captured when the
/// review is created. They are not refreshed when the user or place is
/// later renamed.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id:         String,
    pub user_id:    String,
    pub username:   String,
    #[serde(rename = "placeId")]
    pub place_id:   String,
    #[serde(rename = "placeName")]
    pub place_name: String,
    pub rating:     i64,
    pub comment:    String,
    pub likes:      i64,
    pub liked_by:   Vec<String>,
    pub comments:   Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id:         String,
    pub user_id:    String,
    pub username:   String,
    pub place_id:   String,
    pub place_name: String,
    pub rating:     i64,
    pub comment:    String,
    pub likes:      i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id:         String,
    pub user_id:    String,
    pub username:   String,
    pub text:       String,
    pub likes:      i64,
    pub liked_by:   Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id:         String,
    pub user_id:    String,
    pub username:   String,
    pub text:       String,
    pub likes:      i64,
    pub created_at: DateTime<Utc>,
}

// ── Review reports ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReviewReport {
    pub id:          String,
    pub review_id:   String,
    pub reporter_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind:        String,
    pub detail:      String,
    pub status:      ReportStatus,
    pub created_at:  DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

// ── Route suggestions ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RouteSuggestion {
    pub id:             String,
    pub user_id:        String,
    pub start_location: String,
    pub end_location:   String,
    pub description:    String,
    pub created_at:     DateTime<Utc>,
    pub updated_at:     DateTime<Utc>,
}
