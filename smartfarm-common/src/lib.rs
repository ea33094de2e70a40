//! # SmartFarm Common Library
//!
//! Shared code for the SmartFarm backend including:
//! - Database initialization and models
//! - Error types
//! - API response envelope
//! - JWT and password authentication primitives
//! - Configuration loading
//! - Event types broadcast over the telemetry channel

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
