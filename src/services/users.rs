use chrono::Utc;

use crate::{
    db::Db,
    errors::{AppError, AppResult},
    models::{Address, User, USER_COLUMNS},
};

/// A self-registered account about to be stored.
pub struct NewUser<'a> {
    pub id:            &'a str,
    pub email:         &'a str,
    pub password_hash: &'a str,
    pub name:          &'a str,
    pub address:       &'a Address,
}

pub async fn find(pool: &Db, id: &str) -> AppResult<User> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list(pool: &Db) -> AppResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
}

/// Insert a `user`-role, `active` account. The unique email index decides
/// concurrent registrations; the loser gets a 409.
pub async fn insert(pool: &Db, user: NewUser<'_>) -> AppResult<()> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role, status, address_line, city,
                            province, zipcode, country, lat, lng, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'user', 'active', ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.name)
    .bind(&user.address.address_line)
    .bind(&user.address.city)
    .bind(&user.address.province)
    .bind(&user.address.zipcode)
    .bind(&user.address.country)
    .bind(user.address.lat)
    .bind(user.address.lng)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(AppError::Conflict("Email already exists".into()))
        }
        Err(other) => Err(other.into()),
    }
}
