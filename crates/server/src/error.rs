//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use lastmile_core::ShipmentError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shipment lifecycle operation failed.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Shipment(err) => match err {
                ShipmentError::Validation(_) => StatusCode::BAD_REQUEST,
                ShipmentError::NotFound(_) => StatusCode::NOT_FOUND,
                ShipmentError::InvalidOtp => StatusCode::FORBIDDEN,
                ShipmentError::InvalidTransition { .. } => StatusCode::CONFLICT,
                ShipmentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            match &self {
                Self::Shipment(ShipmentError::NotFound(_)) => "Shipment not found".to_string(),
                Self::Shipment(ShipmentError::InvalidOtp) => "Invalid OTP".to_string(),
                _ => self.to_string(),
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
