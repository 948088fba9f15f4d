//! Core types for Last Mile.
//!
//! This module provides type-safe wrappers for shipment domain concepts.

pub mod customer;
pub mod id;
pub mod otp;
pub mod status;

pub use customer::{CustomerName, CustomerNameError};
pub use id::ShipmentId;
pub use otp::{OtpCode, OtpError};
pub use status::ShipmentStatus;
