//! Shipment lifecycle service.
//!
//! Owns the state machine:
//!
//! ```text
//! PENDING ──dispatch──▶ IN_TRANSIT ──deliver──▶ DELIVERED
//!    └───────────────────deliver────────────────────▲
//! ```
//!
//! Every mutation follows the same shape: read the record, validate, compute
//! the next record, then commit it with [`ShipmentStore::compare_and_update`]
//! conditioned on the status that was read. A conflict means another request
//! moved the record first; the service re-reads and decides again instead of
//! overwriting.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use crate::random::{OsRandom, RandomSource};
use crate::shipment::Shipment;
use crate::store::{ShipmentStore, StoreError, UpdateOutcome};
use crate::types::{CustomerName, CustomerNameError, OtpCode, ShipmentId, ShipmentStatus};

/// Upper bound on read-decide-commit rounds for one request. The status can
/// move forward at most twice, so a well-behaved store settles well within it.
const MAX_COMMIT_ATTEMPTS: usize = 4;

/// Errors returned by lifecycle operations.
///
/// Each failure is its own variant so callers can tell a wrong code from a
/// wrong tracking identifier without matching on messages.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// Input failed validation.
    #[error("invalid customer name: {0}")]
    Validation(#[from] CustomerNameError),

    /// No shipment exists with the given identifier.
    #[error("shipment not found: {0}")]
    NotFound(ShipmentId),

    /// The supplied OTP does not match the shipment's code.
    #[error("invalid otp")]
    InvalidOtp,

    /// The lifecycle does not allow the requested move.
    #[error("cannot move shipment from {from} to {to}")]
    InvalidTransition {
        /// Status the shipment is in.
        from: ShipmentStatus,
        /// Status that was requested.
        to: ShipmentStatus,
    },

    /// The store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// The shipment lifecycle manager.
///
/// Generic over its store and its random source; both are handed in by the
/// caller. Production code uses [`ShipmentService::new`], which draws
/// identifiers and OTPs from [`OsRandom`].
#[derive(Debug)]
pub struct ShipmentService<S, R = OsRandom> {
    store: S,
    rng: R,
}

impl<S: ShipmentStore> ShipmentService<S> {
    /// Create a service backed by `store`, using OS-seeded randomness.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            rng: OsRandom,
        }
    }
}

impl<S: ShipmentStore, R: RandomSource> ShipmentService<S, R> {
    /// Create a service with an explicit random source.
    #[must_use]
    pub const fn with_random(store: S, rng: R) -> Self {
        Self { store, rng }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create a `PENDING` shipment for `customer_name`.
    ///
    /// Generates the tracking identifier and the six-digit OTP, stores the
    /// record, and returns it with the OTP included.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::Validation` if the name is blank or too long.
    /// Returns `ShipmentError::Storage` if the record cannot be written.
    #[instrument(skip_all)]
    pub async fn create(&self, customer_name: &str) -> Result<Shipment, ShipmentError> {
        let customer_name = CustomerName::parse(customer_name)?;

        let shipment = Shipment::new_pending(
            ShipmentId::generate(&self.rng),
            customer_name,
            OtpCode::generate(&self.rng),
            Utc::now(),
        );

        let stored = self.store.put(&shipment).await?;
        tracing::info!(shipment_id = %stored.shipment_id(), "Shipment created");
        Ok(stored)
    }

    /// Look up a shipment.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::NotFound` if no shipment has this identifier.
    /// Returns `ShipmentError::Storage` if the read fails.
    #[instrument(skip_all, fields(shipment_id = %shipment_id))]
    pub async fn get_shipment(&self, shipment_id: &ShipmentId) -> Result<Shipment, ShipmentError> {
        self.store
            .get_by_shipment_id(shipment_id)
            .await?
            .ok_or_else(|| ShipmentError::NotFound(shipment_id.clone()))
    }

    /// Confirm delivery with the shipment's OTP.
    ///
    /// The OTP is checked before anything else, including on shipments that
    /// are already delivered. Confirming an already delivered shipment with
    /// the right code returns the stored record unchanged, so retries are
    /// safe and `delivered_at` is stamped exactly once. When two requests
    /// race, one commits and the other returns the winner's record.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::NotFound` if no shipment has this identifier.
    /// Returns `ShipmentError::InvalidOtp` if `otp` differs from the code.
    /// Returns `ShipmentError::Storage` if the store fails.
    #[instrument(skip_all, fields(shipment_id = %shipment_id))]
    pub async fn mark_delivered(
        &self,
        shipment_id: &ShipmentId,
        otp: &str,
    ) -> Result<Shipment, ShipmentError> {
        let mut current = self.get_shipment(shipment_id).await?;

        if !current.otp_code().matches(otp) {
            tracing::info!("Delivery rejected: OTP mismatch");
            return Err(ShipmentError::InvalidOtp);
        }

        for _ in 0..MAX_COMMIT_ATTEMPTS {
            if current.status() == ShipmentStatus::Delivered {
                tracing::debug!("Shipment already delivered");
                return Ok(current);
            }

            match self.commit(&current, ShipmentStatus::Delivered).await? {
                Some(stored) => return Ok(stored),
                None => current = self.get_shipment(shipment_id).await?,
            }
        }

        Err(unsettled())
    }

    /// Hand a `PENDING` shipment to a courier.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::NotFound` if no shipment has this identifier.
    /// Returns `ShipmentError::InvalidTransition` unless the shipment is `PENDING`.
    /// Returns `ShipmentError::Storage` if the store fails.
    #[instrument(skip_all, fields(shipment_id = %shipment_id))]
    pub async fn mark_in_transit(
        &self,
        shipment_id: &ShipmentId,
    ) -> Result<Shipment, ShipmentError> {
        let current = self.get_shipment(shipment_id).await?;

        if let Some(stored) = self.commit(&current, ShipmentStatus::InTransit).await? {
            return Ok(stored);
        }

        let latest = self.get_shipment(shipment_id).await?;
        Err(ShipmentError::InvalidTransition {
            from: latest.status(),
            to: ShipmentStatus::InTransit,
        })
    }

    /// Move `current` to `next` if its stored status is still the one read.
    ///
    /// `Ok(None)` means another writer got there first.
    async fn commit(
        &self,
        current: &Shipment,
        next: ShipmentStatus,
    ) -> Result<Option<Shipment>, ShipmentError> {
        let from = current.status();
        let updated = current
            .transition(next, Utc::now())
            .ok_or(ShipmentError::InvalidTransition { from, to: next })?;

        match self.store.compare_and_update(from, &updated).await? {
            UpdateOutcome::Applied(stored) => {
                tracing::info!(%from, to = %next, "Shipment status changed");
                Ok(Some(stored))
            }
            UpdateOutcome::Conflict => {
                tracing::debug!(%from, to = %next, "Concurrent update detected");
                Ok(None)
            }
        }
    }
}

fn unsettled() -> ShipmentError {
    ShipmentError::Storage(StoreError::Unavailable(
        "conflicting updates did not settle".to_owned(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::store::MemoryShipmentStore;

    fn service() -> ShipmentService<MemoryShipmentStore, SeededRandom> {
        ShipmentService::with_random(MemoryShipmentStore::new(), SeededRandom::new(2024))
    }

    /// A code guaranteed to differ from `otp`.
    fn wrong(otp: &OtpCode) -> String {
        if otp.as_str() == "000000" {
            "000001".to_owned()
        } else {
            "000000".to_owned()
        }
    }

    #[tokio::test]
    async fn test_create_pending_shipment() {
        let service = service();
        let shipment = service.create("Alice").await.unwrap();

        assert_eq!(shipment.status(), ShipmentStatus::Pending);
        assert!(shipment.delivered_at().is_none());
        assert!(shipment.delivered_by().is_none());
        assert_eq!(shipment.customer_name().as_str(), "Alice");
        assert_eq!(shipment.otp_code().as_str().len(), 6);
        assert!(shipment.shipment_id().as_str().starts_with(ShipmentId::PREFIX));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let service = service();
        for name in ["", "   "] {
            let result = service.create(name).await;
            assert!(matches!(
                result,
                Err(ShipmentError::Validation(CustomerNameError::Empty))
            ));
        }
        assert!(service.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_create_is_deterministic_with_seeded_random() {
        let a = service().create("Alice").await.unwrap();
        let b = service().create("Alice").await.unwrap();
        assert_eq!(a.shipment_id(), b.shipment_id());
        assert_eq!(a.otp_code(), b.otp_code());
    }

    #[tokio::test]
    async fn test_get_after_create_round_trips() {
        let service = service();
        let created = service.create("Alice").await.unwrap();
        let fetched = service.get_shipment(created.shipment_id()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = service();
        let result = service
            .get_shipment(&ShipmentId::new("nonexistent-id"))
            .await;
        assert!(matches!(result, Err(ShipmentError::NotFound(id)) if id.as_str() == "nonexistent-id"));
    }

    #[tokio::test]
    async fn test_deliver_missing_is_not_found() {
        let service = service();
        let result = service
            .mark_delivered(&ShipmentId::new("nonexistent-id"), "000000")
            .await;
        assert!(matches!(result, Err(ShipmentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_wrong_otp_leaves_status_unchanged() {
        let service = service();
        let created = service.create("Alice").await.unwrap();

        let result = service
            .mark_delivered(created.shipment_id(), &wrong(created.otp_code()))
            .await;
        assert!(matches!(result, Err(ShipmentError::InvalidOtp)));

        let fetched = service.get_shipment(created.shipment_id()).await.unwrap();
        assert_eq!(fetched.status(), ShipmentStatus::Pending);
        assert!(fetched.delivered_at().is_none());
    }

    #[tokio::test]
    async fn test_otp_is_not_normalized() {
        let service = service();
        let created = service.create("Alice").await.unwrap();
        let otp = created.otp_code().as_str();

        for candidate in [format!(" {otp}"), format!("{otp}\n"), format!("{otp}0")] {
            let result = service.mark_delivered(created.shipment_id(), &candidate).await;
            assert!(matches!(result, Err(ShipmentError::InvalidOtp)), "{candidate:?}");
        }
    }

    #[tokio::test]
    async fn test_correct_otp_delivers() {
        let service = service();
        let created = service.create("Alice").await.unwrap();

        let delivered = service
            .mark_delivered(created.shipment_id(), created.otp_code().as_str())
            .await
            .unwrap();

        assert_eq!(delivered.status(), ShipmentStatus::Delivered);
        let delivered_at = delivered.delivered_at().unwrap();
        assert!(delivered_at >= created.created_at());
        assert_eq!(delivered.otp_code(), created.otp_code());

        let fetched = service.get_shipment(created.shipment_id()).await.unwrap();
        assert_eq!(fetched, delivered);
    }

    #[tokio::test]
    async fn test_repeat_delivery_is_idempotent() {
        let service = service();
        let created = service.create("Alice").await.unwrap();
        let otp = created.otp_code().as_str();

        let first = service.mark_delivered(created.shipment_id(), otp).await.unwrap();
        let second = service.mark_delivered(created.shipment_id(), otp).await.unwrap();

        assert_eq!(first.delivered_at(), second.delivered_at());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_wrong_otp_on_delivered_shipment_still_rejected() {
        let service = service();
        let created = service.create("Alice").await.unwrap();
        service
            .mark_delivered(created.shipment_id(), created.otp_code().as_str())
            .await
            .unwrap();

        let result = service
            .mark_delivered(created.shipment_id(), &wrong(created.otp_code()))
            .await;
        assert!(matches!(result, Err(ShipmentError::InvalidOtp)));
    }

    #[tokio::test]
    async fn test_dispatch_then_deliver() {
        let service = service();
        let created = service.create("Alice").await.unwrap();

        let moving = service.mark_in_transit(created.shipment_id()).await.unwrap();
        assert_eq!(moving.status(), ShipmentStatus::InTransit);
        assert!(moving.delivered_at().is_none());

        let delivered = service
            .mark_delivered(created.shipment_id(), created.otp_code().as_str())
            .await
            .unwrap();
        assert_eq!(delivered.status(), ShipmentStatus::Delivered);
    }

    #[tokio::test]
    async fn test_dispatch_only_from_pending() {
        let service = service();
        let created = service.create("Alice").await.unwrap();
        service.mark_in_transit(created.shipment_id()).await.unwrap();

        let again = service.mark_in_transit(created.shipment_id()).await;
        assert!(matches!(
            again,
            Err(ShipmentError::InvalidTransition {
                from: ShipmentStatus::InTransit,
                to: ShipmentStatus::InTransit
            })
        ));

        service
            .mark_delivered(created.shipment_id(), created.otp_code().as_str())
            .await
            .unwrap();
        let after_delivery = service.mark_in_transit(created.shipment_id()).await;
        assert!(matches!(
            after_delivery,
            Err(ShipmentError::InvalidTransition {
                from: ShipmentStatus::Delivered,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_dispatch_missing_is_not_found() {
        let service = service();
        let result = service.mark_in_transit(&ShipmentId::new("missing")).await;
        assert!(matches!(result, Err(ShipmentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_error_kinds_are_distinct() {
        let not_found = ShipmentError::NotFound(ShipmentId::new("x"));
        let invalid = ShipmentError::InvalidOtp;
        assert_ne!(not_found.to_string(), invalid.to_string());
        assert_eq!(invalid.to_string(), "invalid otp");
    }
}
