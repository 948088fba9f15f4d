//! Store selection.
//!
//! The server runs against one concrete store chosen at startup from
//! [`StoreBackend`]. `AppStore` dispatches to it so the lifecycle service and
//! the handlers stay non-generic.

use lastmile_core::{
    MemoryShipmentStore, Shipment, ShipmentId, ShipmentStatus, ShipmentStore, StoreError,
    UpdateOutcome,
};

use crate::config::{ServerConfig, StoreBackend};
use crate::db::{self, PgShipmentStore};

/// Error opening the configured store.
#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    #[error("database URL is required for the postgres store")]
    MissingDatabaseUrl,
    #[error("failed to create database pool: {0}")]
    Pool(#[from] sqlx::Error),
}

/// The store the server was started with.
#[derive(Debug, Clone)]
pub enum AppStore {
    /// `PostgreSQL`-backed storage.
    Postgres(PgShipmentStore),
    /// In-process storage.
    Memory(MemoryShipmentStore),
}

impl AppStore {
    /// Open the store named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreInitError` if the postgres store is selected without a
    /// URL or the pool cannot connect.
    pub async fn connect(config: &ServerConfig) -> Result<Self, StoreInitError> {
        match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_ref()
                    .ok_or(StoreInitError::MissingDatabaseUrl)?;
                let pool = db::create_pool(url).await?;
                tracing::info!("Database pool created");
                Ok(Self::Postgres(PgShipmentStore::new(pool)))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory shipment store; data is lost on restart");
                Ok(Self::Memory(MemoryShipmentStore::new()))
            }
        }
    }
}

impl ShipmentStore for AppStore {
    async fn put(&self, shipment: &Shipment) -> Result<Shipment, StoreError> {
        match self {
            Self::Postgres(store) => store.put(shipment).await,
            Self::Memory(store) => store.put(shipment).await,
        }
    }

    async fn get_by_shipment_id(
        &self,
        shipment_id: &ShipmentId,
    ) -> Result<Option<Shipment>, StoreError> {
        match self {
            Self::Postgres(store) => store.get_by_shipment_id(shipment_id).await,
            Self::Memory(store) => store.get_by_shipment_id(shipment_id).await,
        }
    }

    async fn compare_and_update(
        &self,
        expected: ShipmentStatus,
        next: &Shipment,
    ) -> Result<UpdateOutcome, StoreError> {
        match self {
            Self::Postgres(store) => store.compare_and_update(expected, next).await,
            Self::Memory(store) => store.compare_and_update(expected, next).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(store) => store.ping().await,
            Self::Memory(store) => store.ping().await,
        }
    }
}
