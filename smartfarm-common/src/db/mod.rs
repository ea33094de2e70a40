//! Database access layer
//!
//! Schema initialization and shared row models. Per-entity query
//! functions live in the service crate.

pub mod init;
pub mod models;

pub use init::{init_database, init_memory_database};
