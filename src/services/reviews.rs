//! Review loading and like toggles.
//!
//! A review document is spread over `reviews`, `review_likes`,
//! `review_comments` and `comment_likes`; [`load`] reassembles it.
//! Like counters must always equal the size of their liked-by set.

use chrono::Utc;

use crate::{
    db::Db,
    errors::{AppError, AppResult},
    models::{Comment, CommentRow, Review, ReviewRow},
};

const REVIEW_COLUMNS: &str =
    "id, user_id, username, place_id, place_name, rating, comment, likes, created_at, updated_at";

/// Outcome of a toggle: whether the caller now likes the target, and the new count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}

async fn hydrate(pool: &Db, row: ReviewRow) -> AppResult<Review> {
    let liked_by: Vec<String> = sqlx::query_scalar(
        "SELECT user_id FROM review_likes WHERE review_id = ? ORDER BY rowid",
    )
    .bind(&row.id)
    .fetch_all(pool)
    .await?;

    let comment_rows: Vec<CommentRow> = sqlx::query_as::<_, CommentRow>(
        "SELECT id, user_id, username, text, likes, created_at
         FROM review_comments WHERE review_id = ? ORDER BY seq",
    )
    .bind(&row.id)
    .fetch_all(pool)
    .await?;

    let mut comments = Vec::with_capacity(comment_rows.len());
    for c in comment_rows {
        let liked_by: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM comment_likes WHERE comment_id = ? ORDER BY rowid",
        )
        .bind(&c.id)
        .fetch_all(pool)
        .await?;
        comments.push(Comment {
            id:         c.id,
            user_id:    c.user_id,
            username:   c.username,
            text:       c.text,
            likes:      c.likes,
            liked_by,
            created_at: c.created_at,
        });
    }

    Ok(Review {
        id:         row.id,
        user_id:    row.user_id,
        username:   row.username,
        place_id:   row.place_id,
        place_name: row.place_name,
        rating:     row.rating,
        comment:    row.comment,
        likes:      row.likes,
        liked_by,
        comments,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn load(pool: &Db, review_id: &str) -> AppResult<Review> {
    let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?");
    let row = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(review_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;
    hydrate(pool, row).await
}

/// All reviews, optionally restricted to one external place id.
pub async fn list(pool: &Db, place_id: Option<&str>) -> AppResult<Vec<Review>> {
    let rows: Vec<ReviewRow> = match place_id {
        Some(pid) => {
            let sql = format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE place_id = ? ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, ReviewRow>(&sql).bind(pid).fetch_all(pool).await?
        }
        None => {
            let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC");
            sqlx::query_as::<_, ReviewRow>(&sql).fetch_all(pool).await?
        }
    };

    let mut reviews = Vec::with_capacity(rows.len());
    for row in rows {
        reviews.push(hydrate(pool, row).await?);
    }
    Ok(reviews)
}

/// Toggle the caller's like on a review.
///
/// Membership is read first and the write applied afterwards in its own
/// transaction, so two concurrent toggles by the same user can interleave.
pub async fn toggle_review_like(pool: &Db, review_id: &str, user_id: &str) -> AppResult<LikeState> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = ?)")
        .bind(review_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }

    let liked: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM review_likes WHERE review_id = ? AND user_id = ?)",
    )
    .bind(review_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let mut tx = pool.begin().await?;
    if liked {
        sqlx::query("DELETE FROM review_likes WHERE review_id = ? AND user_id = ?")
            .bind(review_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE reviews SET likes = likes - 1 WHERE id = ?")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("INSERT OR IGNORE INTO review_likes (review_id, user_id) VALUES (?, ?)")
            .bind(review_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE reviews SET likes = likes + 1 WHERE id = ?")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
    }
    let likes: i64 = sqlx::query_scalar("SELECT likes FROM reviews WHERE id = ?")
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(LikeState { liked: !liked, likes })
}

/// Toggle the caller's like on one comment of a review. The comment must
/// belong to that review.
pub async fn toggle_comment_like(
    pool: &Db,
    review_id: &str,
    comment_id: &str,
    user_id: &str,
) -> AppResult<LikeState> {
    let belongs: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM review_comments WHERE id = ? AND review_id = ?)",
    )
    .bind(comment_id)
    .bind(review_id)
    .fetch_one(pool)
    .await?;
    if !belongs {
        return Err(AppError::NotFound);
    }

    let liked: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE comment_id = ? AND user_id = ?)",
    )
    .bind(comment_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let mut tx = pool.begin().await?;
    if liked {
        sqlx::query("DELETE FROM comment_likes WHERE comment_id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE review_comments SET likes = likes - 1 WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("INSERT OR IGNORE INTO comment_likes (comment_id, user_id) VALUES (?, ?)")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE review_comments SET likes = likes + 1 WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;
    }
    let likes: i64 = sqlx::query_scalar("SELECT likes FROM review_comments WHERE id = ?")
        .bind(comment_id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(LikeState { liked: !liked, likes })
}

/// Append a comment to the end of a review's thread.
pub async fn append_comment(
    pool: &Db,
    review_id: &str,
    user_id: &str,
    username: &str,
    text: &str,
) -> AppResult<Comment> {
    let id  = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = ?)")
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(AppError::NotFound);
    }
    sqlx::query(
        "INSERT INTO review_comments (id, review_id, seq, user_id, username, text, likes, created_at)
         VALUES (?, ?, (SELECT COALESCE(MAX(seq), 0) + 1 FROM review_comments WHERE review_id = ?),
                 ?, ?, ?, 0, ?)",
    )
    .bind(&id)
    .bind(review_id)
    .bind(review_id)
    .bind(user_id)
    .bind(username)
    .bind(text)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Comment {
        id,
        user_id:    user_id.to_owned(),
        username:   username.to_owned(),
        text:       text.to_owned(),
        likes:      0,
        liked_by:   Vec::new(),
        created_at: now,
    })
}
