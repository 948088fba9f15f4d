//! Shipment storage abstraction.
//!
//! A [`ShipmentStore`] is durable keyed storage for shipment records. It knows
//! nothing about OTPs or which transitions are legal; the lifecycle service
//! decides that and asks the store to commit the result.
//!
//! # Implementation Notes
//!
//! - Records are keyed by [`ShipmentId`]; uniqueness of generated identifiers
//!   is the service's job, not re-validated here
//! - A missing record is `Ok(None)`, never an error
//! - [`ShipmentStore::compare_and_update`] MUST check and write atomically
//!   (a single conditional `UPDATE`, or a mutex held across check and write)

mod memory;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::shipment::Shipment;
use crate::types::{ShipmentId, ShipmentStatus};

pub use memory::MemoryShipmentStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached or is not accepting work.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be turned back into a valid shipment.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result of a conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The stored status matched and the new record was written.
    Applied(Shipment),
    /// The stored status no longer matched (or the record is gone); nothing
    /// was written.
    Conflict,
}

/// Keyed persistence for shipments.
pub trait ShipmentStore: Send + Sync {
    /// Insert a record, or overwrite the one stored under the same identifier.
    ///
    /// Returns the record as stored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails; the previous record, if any,
    /// is left untouched.
    fn put(&self, shipment: &Shipment)
    -> impl Future<Output = Result<Shipment, StoreError>> + Send;

    /// Look up a record by exact identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails. A missing record is `Ok(None)`.
    fn get_by_shipment_id(
        &self,
        shipment_id: &ShipmentId,
    ) -> impl Future<Output = Result<Option<Shipment>, StoreError>> + Send;

    /// Replace the record stored under `next.shipment_id()` with `next`, but
    /// only if the stored status is still `expected`.
    ///
    /// Statuses only move forward, so an unchanged status means no other
    /// writer has transitioned the record since it was read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend fails. A lost race is
    /// `Ok(UpdateOutcome::Conflict)`.
    fn compare_and_update(
        &self,
        expected: ShipmentStatus,
        next: &Shipment,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if it is not.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send {
        async { Ok(()) }
    }
}

impl<S: ShipmentStore> ShipmentStore for Arc<S> {
    fn put(
        &self,
        shipment: &Shipment,
    ) -> impl Future<Output = Result<Shipment, StoreError>> + Send {
        (**self).put(shipment)
    }

    fn get_by_shipment_id(
        &self,
        shipment_id: &ShipmentId,
    ) -> impl Future<Output = Result<Option<Shipment>, StoreError>> + Send {
        (**self).get_by_shipment_id(shipment_id)
    }

    fn compare_and_update(
        &self,
        expected: ShipmentStatus,
        next: &Shipment,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send {
        (**self).compare_and_update(expected, next)
    }

    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).ping()
    }
}
