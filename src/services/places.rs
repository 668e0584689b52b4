//! Place lookup and rating aggregation.
//!
//! A place has two identifiers: the external `place_id` used in URLs and as
//! the review join key, and the storage `id`. Lookups go through
//! [`PlaceKey`]: exact external match first, then storage id, then not found.

use uuid::Uuid;

use crate::{
    db::Db,
    errors::{AppError, AppResult},
    models::{Place, PLACE_COLUMNS},
};

/// One step in the place lookup chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceKey {
    External(String),
    Storage(String),
}

impl PlaceKey {
    /// The ordered candidates for a raw path segment. A segment that does not
    /// parse as a storage id only yields the external candidate.
    pub fn candidates(raw: &str) -> Vec<PlaceKey> {
        let mut keys = vec![PlaceKey::External(raw.to_owned())];
        if let Ok(id) = Uuid::parse_str(raw) {
            keys.push(PlaceKey::Storage(id.to_string()));
        }
        keys
    }
}

async fn find_by_key(pool: &Db, key: &PlaceKey) -> AppResult<Option<Place>> {
    let (column, value) = match key {
        PlaceKey::External(v) => ("place_id", v),
        PlaceKey::Storage(v)  => ("id", v),
    };
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE {column} = ? LIMIT 1");
    Ok(sqlx::query_as::<_, Place>(&sql).bind(value).fetch_optional(pool).await?)
}

/// Resolve a raw identifier through the lookup chain.
pub async fn resolve(pool: &Db, raw: &str) -> AppResult<Place> {
    for key in PlaceKey::candidates(raw) {
        if let Some(place) = find_by_key(pool, &key).await? {
            return Ok(place);
        }
    }
    Err(AppError::NotFound)
}

/// Sum of ratings divided by their count; `0.0` for no reviews.
pub fn mean_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: i64 = ratings.iter().sum();
    total as f64 / ratings.len() as f64
}

/// Overwrite `place.rating` with the mean of the reviews joined on its
/// external identifier.
pub async fn apply_rating(pool: &Db, place: &mut Place) -> AppResult<()> {
    let ratings: Vec<i64> = sqlx::query_scalar("SELECT rating FROM reviews WHERE place_id = ?")
        .bind(&place.place_id)
        .fetch_all(pool)
        .await?;
    place.rating = mean_rating(&ratings);
    Ok(())
}

/// Every place with its rating recomputed. Not cached.
pub async fn list_with_ratings(pool: &Db) -> AppResult<Vec<Place>> {
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places ORDER BY created_at, place_id");
    let mut places = sqlx::query_as::<_, Place>(&sql).fetch_all(pool).await?;
    for place in places.iter_mut() {
        apply_rating(pool, place).await?;
    }
    Ok(places)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_no_reviews_is_zero() {
        assert_eq!(mean_rating(&[]), 0.0);
    }

    #[test]
    fn mean_is_sum_over_count() {
        assert_eq!(mean_rating(&[5]), 5.0);
        assert_eq!(mean_rating(&[5, 4]), 4.5);
        assert!((mean_rating(&[5, 4, 4]) - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn external_key_is_tried_before_storage_key() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(
            PlaceKey::candidates(&id),
            vec![PlaceKey::External(id.clone()), PlaceKey::Storage(id)]
        );
    }

    #[test]
    fn non_uuid_only_tries_external_key() {
        assert_eq!(PlaceKey::candidates("12"), vec![PlaceKey::External("12".into())]);
    }
}
