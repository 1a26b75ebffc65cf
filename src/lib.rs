mod authentication;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod media;
mod models;
mod state;

use anyhow::Context;
pub use anyhow::Result;
use axum::{extract::DefaultBodyLimit, middleware, routing::*, Extension, Router};
pub use config::Config;
use errors::render_error_pages;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
pub use state::AppState;
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub async fn run_app(config: Config) -> Result<()> {
    let address = config.address;
    let state = AppState::new(config).await?;
    let app = make_router(state);
    info!("Server started on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router(state: Arc<AppState>) -> Router {
    let media = ServeDir::new(&state.config.media_root);
    Router::new()
        .route("/check_health", get(alive))
        .route("/", get(home).post(home_filter))
        .route("/articles", get(article_list))
        .route(
            "/articles/create",
            get(create_article_page).post(create_article),
        )
        .route("/articles/:id", get(article_details).post(comment_article))
        .route(
            "/articles/:id/edit",
            get(edit_article_page).post(edit_article),
        )
        .route(
            "/articles/:id/delete",
            get(delete_article_page).post(delete_article),
        )
        .route("/articles/:id/like", post(like_article))
        .route("/unauthorised", get(unauthorised_message))
        .route("/login", get(login_page).post(login_user))
        .route("/register", get(register_page).post(register_user))
        .route("/logout", post(logout_user))
        .nest_service("/media", media)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn(render_error_pages))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
