use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::utils::get_data_dir;

const DB_FILE_NAME: &str = "websites.db";

/// Handle to the website store. Cloning shares the underlying pool; every
/// operation checks out its own connection and hands it back when done.
#[derive(Clone)]
pub struct DB {
    pub(super) pool: SqlitePool,
}

impl DB {
    pub async fn new(path: Option<&Path>) -> Result<Self> {
        let db_path = match path {
            Some(path) => path.to_path_buf(),
            None => get_data_dir()?.join(DB_FILE_NAME),
        };

        let options = SqliteConnectOptions::from_str(&db_path.to_string_lossy())?
            .create_if_missing(true)
            .foreign_keys(true);

        tracing::info!(path = %db_path.display(), "opening website store");
        Self::connect(options, SqlitePoolOptions::new().max_connections(5)).await
    }

    async fn connect(options: SqliteConnectOptions, pool_options: SqlitePoolOptions) -> Result<Self> {
        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to open the website store")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to migrate the website store")?;
        Ok(Self { pool })
    }
}

#[cfg(test)]
impl DB {
    /// Every in-memory connection is its own database, so the pool is pinned
    /// to a single connection that never expires.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::connect(options, pool_options).await
    }
}
