use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Like};

pub async fn get_like_in_db(
    pool: &SqlitePool,
    profile_id: i64,
    article_id: i64,
) -> Result<Option<Like>, RequestError> {
    let like = sqlx::query_as::<Sqlite, Like>(
        r#"
        SELECT id, article_id, profile_id, created_at
        FROM likes
        WHERE profile_id = ? AND article_id = ?
        "#,
    )
    .bind(profile_id)
    .bind(article_id)
    .fetch_optional(pool)
    .await?;
    Ok(like)
}

pub async fn count_likes_in_db(pool: &SqlitePool, article_id: i64) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM likes WHERE article_id = ?")
        .bind(article_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Removes the like when present, adds it otherwise. Returns whether the
/// profile likes the article afterwards.
pub async fn toggle_like_in_db(
    pool: &SqlitePool,
    profile_id: i64,
    article_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT id FROM likes WHERE profile_id = ? AND article_id = ?
        "#,
    )
    .bind(profile_id)
    .bind(article_id)
    .fetch_optional(&mut tx)
    .await?;

    let liked = match existing {
        Some(like_id) => {
            sqlx::query("DELETE FROM likes WHERE id = ?")
                .bind(like_id)
                .execute(&mut tx)
                .await?;
            false
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO likes (profile_id, article_id)
                VALUES (?, ?)
                ON CONFLICT (profile_id, article_id) DO NOTHING
                "#,
            )
            .bind(profile_id)
            .bind(article_id)
            .execute(&mut tx)
            .await?;
            true
        }
    };

    tx.commit().await?;
    Ok(liked)
}
