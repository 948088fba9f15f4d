//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! lm-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LASTMILE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time by `sqlx::migrate!`.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the shipment database migrations.
pub async fn run() -> Result<(), MigrationError> {
    let database_url =
        super::database_url().ok_or(MigrationError::MissingEnvVar("LASTMILE_DATABASE_URL"))?;

    tracing::info!("Connecting to shipment database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running shipment migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Shipment migrations complete!");
    Ok(())
}
