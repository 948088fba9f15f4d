//! Shipment API routes.
//!
//! Parameters are bound from the query string (`customerName`, `otp`) so
//! existing tracking clients keep working unchanged.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lastmile_core::{Shipment, ShipmentId, ShipmentStatus};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Shipment as returned to API callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResponse {
    pub shipment_id: String,
    pub customer_name: String,
    /// Present on creation, and on reads while OTP exposure is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_code: Option<String>,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivered_by: Option<String>,
}

impl ShipmentResponse {
    /// Build a response, optionally carrying the OTP.
    #[must_use]
    pub fn new(shipment: &Shipment, include_otp: bool) -> Self {
        Self {
            shipment_id: shipment.shipment_id().to_string(),
            customer_name: shipment.customer_name().to_string(),
            otp_code: include_otp.then(|| shipment.otp_code().to_string()),
            status: shipment.status(),
            created_at: shipment.created_at(),
            delivered_at: shipment.delivered_at(),
            delivered_by: shipment.delivered_by().map(str::to_owned),
        }
    }
}

/// Query parameters for creating a shipment.
#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    #[serde(rename = "customerName")]
    pub customer_name: Option<String>,
}

/// Query parameters for confirming delivery.
#[derive(Debug, Deserialize)]
pub struct DeliverQuery {
    pub otp: Option<String>,
}

fn read_response(state: &AppState, shipment: &Shipment) -> Json<ShipmentResponse> {
    Json(ShipmentResponse::new(
        shipment,
        state.config().expose_otp_on_read,
    ))
}

/// Create a shipment.
///
/// POST /api/shipments/create?customerName=Alice
///
/// The response always includes the OTP; this is how the code reaches the
/// customer.
///
/// # Errors
///
/// Returns 400 if `customerName` is missing, blank, or malformed.
pub async fn create(
    State(state): State<AppState>,
    query: std::result::Result<Query<CreateQuery>, QueryRejection>,
) -> Result<Json<ShipmentResponse>> {
    let Query(query) = query?;
    let customer_name = query.customer_name.unwrap_or_default();
    let shipment = state.shipments().create(&customer_name).await?;
    Ok(Json(ShipmentResponse::new(&shipment, true)))
}

/// Track a shipment.
///
/// GET /api/shipments/{shipmentId}
///
/// # Errors
///
/// Returns 404 if the shipment does not exist.
pub async fn track(
    State(state): State<AppState>,
    Path(shipment_id): Path<String>,
) -> Result<Json<ShipmentResponse>> {
    let shipment = state
        .shipments()
        .get_shipment(&ShipmentId::from(shipment_id))
        .await?;
    Ok(read_response(&state, &shipment))
}

/// Mark a shipment as in transit.
///
/// POST /api/shipments/{shipmentId}/dispatch
///
/// # Errors
///
/// Returns 404 if the shipment does not exist, 409 unless it is `PENDING`.
pub async fn dispatch(
    State(state): State<AppState>,
    Path(shipment_id): Path<String>,
) -> Result<Json<ShipmentResponse>> {
    let shipment = state
        .shipments()
        .mark_in_transit(&ShipmentId::from(shipment_id))
        .await?;
    Ok(read_response(&state, &shipment))
}

/// Confirm delivery.
///
/// POST /api/shipments/{shipmentId}/deliver?otp=048213
///
/// Repeating a successful confirmation returns the same record.
///
/// # Errors
///
/// Returns 400 if `otp` is missing or malformed, 404 if the shipment does not exist,
/// 403 if the OTP is wrong.
pub async fn deliver(
    State(state): State<AppState>,
    Path(shipment_id): Path<String>,
    query: std::result::Result<Query<DeliverQuery>, QueryRejection>,
) -> Result<Json<ShipmentResponse>> {
    let Query(query) = query?;
    let otp = query
        .otp
        .ok_or_else(|| AppError::BadRequest("missing otp parameter".to_string()))?;

    let shipment = state
        .shipments()
        .mark_delivered(&ShipmentId::from(shipment_id), &otp)
        .await?;
    Ok(read_response(&state, &shipment))
}
