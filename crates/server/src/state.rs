//! Application state shared across handlers.

use std::sync::Arc;

use lastmile_core::ShipmentService;

use crate::config::ServerConfig;
use crate::store::AppStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the shipment lifecycle service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    shipments: ShipmentService<AppStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Shipment store opened from the configuration
    #[must_use]
    pub fn new(config: ServerConfig, store: AppStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                shipments: ShipmentService::new(store),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the shipment lifecycle service.
    #[must_use]
    pub fn shipments(&self) -> &ShipmentService<AppStore> {
        &self.inner.shipments
    }
}
