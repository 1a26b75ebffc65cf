use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::RegisterForm,
    errors::RequestError,
    models::{User, UserProfile},
};

/// Creates the account and its profile together. `user.password` must
/// already be hashed.
pub async fn insert_user(
    pool: &SqlitePool,
    user: &RegisterForm,
) -> Result<(User, UserProfile), RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (username, email, password)
        VALUES (?, ?, ?)
        RETURNING id, username, email, password, created_at
        "#,
    )
    .bind(user.username.trim())
    .bind(user.email.trim())
    .bind(&user.password)
    .fetch_one(&mut tx)
    .await?;

    let profile = sqlx::query_as::<Sqlite, UserProfile>(
        r#"
        INSERT INTO user_profiles (user_id)
        VALUES (?)
        RETURNING id, user_id, created_at
        "#,
    )
    .bind(user.id)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok((user, profile))
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>(
        r#"
        SELECT id, username, email, password, created_at FROM users WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

/// SQLITE_CONSTRAINT_UNIQUE, reported by sqlx as the extended result code.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

pub fn is_unique_violation(error: &RequestError) -> bool {
    match error {
        RequestError::DatabaseError(sqlx::Error::Database(e)) => {
            e.code().as_deref() == Some(SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}
