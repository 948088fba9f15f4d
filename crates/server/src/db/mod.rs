//! Database operations for shipment `PostgreSQL`.
//!
//! # Database: `lastmile`
//!
//! ## Tables
//!
//! - `shipments` - One row per shipment, keyed internally by `id` and
//!   externally by the unique `shipment_id`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p lastmile-cli -- migrate
//! ```

pub mod shipments;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use lastmile_core::StoreError;

pub use shipments::PgShipmentStore;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Translate a sqlx failure into the core storage error.
///
/// Pool and I/O failures mean the database cannot be reached; everything else
/// is carried as an opaque backend error.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(err.to_string())
        }
        sqlx::Error::Io(ref io) => StoreError::Unavailable(io.to_string()),
        other => StoreError::Backend(Box::new(other)),
    }
}
