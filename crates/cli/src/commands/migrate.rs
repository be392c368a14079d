//! Database migration command.
//!
//! Applies the migrations embedded from `crates/api/migrations/` to the
//! database named by `TRADEPOST_DATABASE_URL` (or `DATABASE_URL`).

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Missing environment variable: set TRADEPOST_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrateError> {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("TRADEPOST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrateError::MissingDatabaseUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&database_url)
        .await?;

    tracing::info!("Running migrations");
    sqlx::migrate!("../api/migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
