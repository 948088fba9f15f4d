//! Shipment commands.
//!
//! These run the same lifecycle service as the server, directly against
//! `PostgreSQL`, and print the resulting record as JSON. The OTP is always
//! printed since only operators have access to this tool.
//!
//! # Environment Variables
//!
//! - `LASTMILE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use lastmile_core::{Shipment, ShipmentError, ShipmentId, ShipmentService};
use lastmile_server::db::{self, PgShipmentStore};
use lastmile_server::routes::shipments::ShipmentResponse;
use thiserror::Error;

/// Errors that can occur during shipment commands.
#[derive(Debug, Error)]
pub enum ShipmentCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// The lifecycle operation was rejected.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    /// Output could not be rendered.
    #[error("Failed to render shipment: {0}")]
    Json(#[from] serde_json::Error),
}

async fn service() -> Result<ShipmentService<PgShipmentStore>, ShipmentCommandError> {
    let database_url = super::database_url()
        .ok_or(ShipmentCommandError::MissingEnvVar("LASTMILE_DATABASE_URL"))?;

    tracing::info!("Connecting to shipment database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(ShipmentService::new(PgShipmentStore::new(pool)))
}

fn print(shipment: &Shipment) -> Result<(), ShipmentCommandError> {
    let json = serde_json::to_string_pretty(&ShipmentResponse::new(shipment, true))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

/// Create a shipment for `customer_name`.
pub async fn create(customer_name: &str) -> Result<(), ShipmentCommandError> {
    let shipment = service().await?.create(customer_name).await?;
    tracing::info!(shipment_id = %shipment.shipment_id(), "Shipment created");
    print(&shipment)
}

/// Show a shipment.
pub async fn track(shipment_id: &str) -> Result<(), ShipmentCommandError> {
    let shipment = service()
        .await?
        .get_shipment(&ShipmentId::from(shipment_id))
        .await?;
    print(&shipment)
}

/// Mark a shipment as in transit.
pub async fn dispatch(shipment_id: &str) -> Result<(), ShipmentCommandError> {
    let shipment = service()
        .await?
        .mark_in_transit(&ShipmentId::from(shipment_id))
        .await?;
    print(&shipment)
}

/// Confirm delivery of a shipment.
pub async fn deliver(shipment_id: &str, otp: &str) -> Result<(), ShipmentCommandError> {
    let shipment = service()
        .await?
        .mark_delivered(&ShipmentId::from(shipment_id), otp)
        .await?;
    print(&shipment)
}
