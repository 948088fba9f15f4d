//! In-memory shipment store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ShipmentStore, StoreError, UpdateOutcome};
use crate::shipment::Shipment;
use crate::types::{ShipmentId, ShipmentStatus};

/// A `HashMap` behind a mutex.
///
/// Not durable: records live as long as the process. Used for tests and for
/// running the server without a database. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryShipmentStore {
    shipments: Arc<Mutex<HashMap<ShipmentId, Shipment>>>,
}

impl MemoryShipmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored shipments.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no shipments.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ShipmentId, Shipment>>, StoreError> {
        self.shipments
            .lock()
            .map_err(|_| StoreError::Unavailable("shipment map lock poisoned".to_owned()))
    }
}

impl ShipmentStore for MemoryShipmentStore {
    async fn put(&self, shipment: &Shipment) -> Result<Shipment, StoreError> {
        let mut shipments = self.lock()?;
        shipments.insert(shipment.shipment_id().clone(), shipment.clone());
        Ok(shipment.clone())
    }

    async fn get_by_shipment_id(
        &self,
        shipment_id: &ShipmentId,
    ) -> Result<Option<Shipment>, StoreError> {
        Ok(self.lock()?.get(shipment_id).cloned())
    }

    async fn compare_and_update(
        &self,
        expected: ShipmentStatus,
        next: &Shipment,
    ) -> Result<UpdateOutcome, StoreError> {
        // Check and write under one guard.
        let mut shipments = self.lock()?;
        match shipments.get_mut(next.shipment_id()) {
            Some(current) if current.status() == expected => {
                *current = next.clone();
                Ok(UpdateOutcome::Applied(next.clone()))
            }
            _ => Ok(UpdateOutcome::Conflict),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
