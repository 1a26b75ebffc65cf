use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::{ArticleFilter, Order};
use crate::errors::RequestError;
use crate::models::Article;

use super::{escape_like, QueryBuilder};

const ARTICLE_COLUMNS: &str = r#"
            SELECT articles.id          AS "id",
                   articles.title       AS "title",
                   articles.image       AS "image",
                   articles.body        AS "body",
                   articles.profile_id  AS "profile_id",
                   articles.created_at  AS "created_at",
                   articles.updated_at  AS "updated_at",
                   users.username       AS "author_username"
            FROM   articles
                JOIN user_profiles
                    ON user_profiles.id = articles.profile_id
                JOIN users
                    ON users.id = user_profiles.user_id
"#;

const FILTER_CLAUSE: &str = r#"
            WHERE  articles.title LIKE '%' || ? || '%' ESCAPE '\'
"#;

fn order_clause(order: Order) -> &'static str {
    match order {
        Order::Asc => "ORDER BY articles.title ASC, articles.id ASC",
        Order::Desc => "ORDER BY articles.title DESC, articles.id DESC",
    }
}

/// Articles whose title contains `filter.text`, ignoring ASCII case.
pub async fn list_articles_in_db(
    pool: &SqlitePool,
    ArticleFilter { order, text }: &ArticleFilter,
) -> Result<Vec<Article>, RequestError> {
    let query = format!("{ARTICLE_COLUMNS} {FILTER_CLAUSE} {}", order_clause(*order));
    let articles = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(escape_like(text))
        .fetch_all(pool)
        .await?;
    Ok(articles)
}

pub async fn list_all_articles_in_db(pool: &SqlitePool) -> Result<Vec<Article>, RequestError> {
    let query = format!("{ARTICLE_COLUMNS} ORDER BY articles.id ASC");
    let articles = sqlx::query_as::<Sqlite, Article>(&query)
        .fetch_all(pool)
        .await?;
    Ok(articles)
}

pub async fn get_article_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Article>, RequestError> {
    let query = format!("{ARTICLE_COLUMNS} WHERE articles.id = ?");
    let result = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn create_article_in_db(
    pool: &SqlitePool,
    profile_id: i64,
    title: &str,
    body: &str,
    image: Option<&str>,
) -> Result<i64, RequestError> {
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO articles (title, body, image, profile_id)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(body)
    .bind(image)
    .bind(profile_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Saves the edit and drops every like the article had, in one transaction.
/// `image` replaces the stored image only when `Some`.
pub async fn update_article_in_db(
    pool: &SqlitePool,
    id: i64,
    profile_id: i64,
    title: String,
    body: String,
    image: Option<String>,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let (assignments, params) = QueryBuilder::new(String::from("SET "), Some(", "))
        .add_param("title", Some(title))
        .add_param("body", Some(body))
        .add_param("image", image)
        .add_raw("updated_at = CURRENT_TIMESTAMP")
        .build();
    let query = format!("UPDATE articles {assignments} WHERE id = ? AND profile_id = ?");
    let mut update = sqlx::query(&query);
    for param in params {
        update = update.bind(param);
    }
    let result = update.bind(id).bind(profile_id).execute(&mut tx).await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::Forbidden);
    }

    sqlx::query("DELETE FROM likes WHERE article_id = ?")
        .bind(id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delete_article_in_db(
    pool: &SqlitePool,
    id: i64,
    profile_id: i64,
) -> Result<(), RequestError> {
    let result = sqlx::query(
        r#"
        DELETE FROM articles
        WHERE articles.id = ? AND articles.profile_id = ?
        "#,
    )
    .bind(id)
    .bind(profile_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::Forbidden);
    }
    Ok(())
}
