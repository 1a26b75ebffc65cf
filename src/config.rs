use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context, Result};
use tracing::info;

const DEFAULT_ADDRESS: &str = "127.0.0.1:3001";
const DEFAULT_MEDIA_ROOT: &str = "media";

#[derive(Debug, Clone)]
pub struct Config {
    pub address: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    /// Directory uploaded article images are written to and served from.
    pub media_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            address: try_load("APP_ADDRESS", DEFAULT_ADDRESS)?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            media_root: try_load("MEDIA_ROOT", DEFAULT_MEDIA_ROOT)?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {value:?}: {e}"))
}
