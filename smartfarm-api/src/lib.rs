//! SmartFarm API service library
//!
//! Exposes the router and shared state so integration tests can drive
//! the full HTTP surface without binding a socket.

pub mod api;
pub mod db;
pub mod domain;
pub mod error;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, Result};
