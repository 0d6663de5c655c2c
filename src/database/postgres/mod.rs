// Postgres schema management
// Applies the chunk table, its policies and the search procedure with sqlx migrations


use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{debug, info};

pub static MIGRATOR: Migrator = sqlx::migrate!("src/database/postgres/migrations");

/// Connect with a direct database URL and apply pending migrations
pub async fn apply_migrations(database_url: &str) -> Result<()> {
    info!("Running database migrations");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("Failed to connect to the database")?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run schema migration")?;

    pool.close().await;
    debug!("Database migrations completed successfully");
    Ok(())
}
