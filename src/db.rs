use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::Config;

pub type Db = SqlitePool;

const CONNECT_ATTEMPTS: u32 = 3;

/// Open the connection pool, retrying with a linear backoff (1s, 2s, ...)
/// before giving up.
pub async fn connect(config: &Config) -> anyhow::Result<Db> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut attempt = 0;
    loop {
        attempt += 1;
        match SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                tracing::info!("Database connection pool established");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "Database connection attempt failed");
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to connect to database after {CONNECT_ATTEMPTS} attempts: {e}"
                ));
            }
        }
    }
}

/// Run all SQLx migrations from the `migrations/` directory embedded at compile time.
pub async fn run_migrations(pool: &Db) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
