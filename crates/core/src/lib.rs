//! Last Mile Core - Shipment lifecycle library.
//!
//! This crate owns the delivery shipment state machine used by every Last Mile
//! component:
//! - `server` - HTTP API over the lifecycle operations
//! - `cli` - Command-line tools for migrations and manual operations
//!
//! # Architecture
//!
//! The core crate contains domain types, the [`ShipmentStore`] trait, an
//! in-memory store, and the [`ShipmentService`] that enforces the lifecycle.
//! It performs no HTTP and no SQL; the `postgres` feature only adds `sqlx`
//! type mappings so the server can persist these types directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for shipment IDs, OTP codes, customer names, and statuses
//! - [`shipment`] - The `Shipment` record and its transitions
//! - [`store`] - Storage abstraction with compare-and-update semantics
//! - [`random`] - Injectable randomness for identifiers and OTPs
//! - [`service`] - The lifecycle manager

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod random;
pub mod service;
pub mod shipment;
pub mod store;
pub mod types;

pub use random::{OsRandom, RandomSource, SeededRandom};
pub use service::{ShipmentError, ShipmentService};
pub use shipment::{RecordError, Shipment};
pub use store::{MemoryShipmentStore, ShipmentStore, StoreError, UpdateOutcome};
pub use types::*;
