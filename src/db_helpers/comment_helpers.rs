use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Comment};

const COMMENT_QUERY: &str = r#"
        SELECT comments.id          AS "id",
               comments.text        AS "text",
               comments.article_id  AS "article_id",
               comments.profile_id  AS "profile_id",
               comments.created_at  AS "created_at",
               users.username       AS "author_username"
        FROM   comments
            JOIN user_profiles
                ON user_profiles.id = comments.profile_id
            JOIN users
                ON users.id = user_profiles.user_id
"#;

pub async fn add_comment_to_article_in_db(
    pool: &SqlitePool,
    profile_id: i64,
    article_id: i64,
    text: &str,
) -> Result<i64, RequestError> {
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO comments (text, profile_id, article_id)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(profile_id)
    .bind(article_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Oldest first.
pub async fn get_comments_for_article_in_db(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_QUERY} WHERE comments.article_id = ? ORDER BY comments.created_at, comments.id"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(article_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}
