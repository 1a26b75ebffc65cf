use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{config::Config, init_db, Result};

pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let pool = init_db(&config.database_url).await?;
        tokio::fs::create_dir_all(&config.media_root).await?;
        Ok(Arc::new(Self { pool, config }))
    }
}
