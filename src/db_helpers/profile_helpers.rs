use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;

/// Looks up the profile id and username behind a session's user id.
pub async fn get_account_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<(i64, String)>, RequestError> {
    let result = sqlx::query_as::<Sqlite, (i64, String)>(
        r#"
        SELECT user_profiles.id, users.username
        FROM users
            JOIN user_profiles ON user_profiles.user_id = users.id
        WHERE users.id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}
