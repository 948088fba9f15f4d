//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Liveness check
//! GET  /health/ready                         - Readiness check (store reachable)
//!
//! # Shipments
//! POST /api/shipments/create?customerName=   - Create a shipment (returns OTP)
//! GET  /api/shipments/{shipmentId}           - Track a shipment
//! POST /api/shipments/{shipmentId}/dispatch  - Mark in transit
//! POST /api/shipments/{shipmentId}/deliver?otp= - Confirm delivery with OTP
//! ```

pub mod health;
pub mod shipments;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the shipment routes router.
pub fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(shipments::create))
        .route("/{shipment_id}", get(shipments::track))
        .route("/{shipment_id}/dispatch", post(shipments::dispatch))
        .route("/{shipment_id}/deliver", post(shipments::deliver))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/shipments", shipment_routes())
}

/// Build the complete application with state and request tracing applied.
pub fn app(state: AppState) -> Router {
    routes().with_state(state).layer(TraceLayer::new_for_http())
}
