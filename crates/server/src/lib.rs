//! Last Mile Server library.
//!
//! This crate provides the shipment tracking HTTP API as a library,
//! allowing it to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
