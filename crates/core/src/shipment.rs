//! The shipment record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{CustomerName, OtpCode, ShipmentId, ShipmentStatus};

/// A stored record violates the shipment invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// `delivered_at` is present without `DELIVERED`, or missing with it.
    #[error("delivered_at must be set exactly when status is DELIVERED (status {status})")]
    DeliveredAtMismatch {
        /// Status found on the record.
        status: ShipmentStatus,
    },
    /// Delivery time precedes creation time.
    #[error("delivered_at precedes created_at")]
    DeliveredBeforeCreated,
}

/// A delivery shipment.
///
/// Fields are read-only outside this crate. New records come from
/// [`Shipment::new_pending`], stored ones from [`Shipment::restore`], and the
/// only mutation is [`Shipment::transition`], which returns a new record.
/// Together they keep `delivered_at` set exactly when the status is
/// `DELIVERED`.
///
/// Serializes with camelCase field names (`shipmentId`, `otpCode`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    shipment_id: ShipmentId,
    customer_name: CustomerName,
    otp_code: OtpCode,
    status: ShipmentStatus,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    delivered_by: Option<String>,
}

impl Shipment {
    /// A freshly created shipment in `PENDING`.
    #[must_use]
    pub const fn new_pending(
        shipment_id: ShipmentId,
        customer_name: CustomerName,
        otp_code: OtpCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            shipment_id,
            customer_name,
            otp_code,
            status: ShipmentStatus::Pending,
            created_at,
            delivered_at: None,
            delivered_by: None,
        }
    }

    /// Rebuild a shipment from persisted fields.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the fields break the delivery invariants.
    pub fn restore(
        shipment_id: ShipmentId,
        customer_name: CustomerName,
        otp_code: OtpCode,
        status: ShipmentStatus,
        created_at: DateTime<Utc>,
        delivered_at: Option<DateTime<Utc>>,
        delivered_by: Option<String>,
    ) -> Result<Self, RecordError> {
        match (status, delivered_at) {
            (ShipmentStatus::Delivered, Some(at)) if at < created_at => {
                return Err(RecordError::DeliveredBeforeCreated);
            }
            (ShipmentStatus::Delivered, Some(_))
            | (ShipmentStatus::Pending | ShipmentStatus::InTransit, None) => {}
            _ => return Err(RecordError::DeliveredAtMismatch { status }),
        }

        Ok(Self {
            shipment_id,
            customer_name,
            otp_code,
            status,
            created_at,
            delivered_at,
            delivered_by,
        })
    }

    /// The record after moving to `next` at time `at`.
    ///
    /// Entering `DELIVERED` stamps `delivered_at` with `at`, clamped so it
    /// never precedes `created_at`. Returns `None` when the lifecycle does
    /// not allow the move.
    #[must_use]
    pub fn transition(&self, next: ShipmentStatus, at: DateTime<Utc>) -> Option<Self> {
        if !self.status.can_transition_to(next) {
            return None;
        }

        let delivered_at = (next == ShipmentStatus::Delivered).then(|| at.max(self.created_at));

        Some(Self {
            status: next,
            delivered_at,
            ..self.clone()
        })
    }

    /// External tracking identifier.
    #[must_use]
    pub const fn shipment_id(&self) -> &ShipmentId {
        &self.shipment_id
    }

    /// Customer the shipment is addressed to.
    #[must_use]
    pub const fn customer_name(&self) -> &CustomerName {
        &self.customer_name
    }

    /// Delivery confirmation code.
    #[must_use]
    pub const fn otp_code(&self) -> &OtpCode {
        &self.otp_code
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ShipmentStatus {
        self.status
    }

    /// When the shipment was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When delivery was confirmed, if it has been.
    #[must_use]
    pub const fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Who confirmed delivery. Never populated by any current operation.
    #[must_use]
    pub fn delivered_by(&self) -> Option<&str> {
        self.delivered_by.as_deref()
    }
}
