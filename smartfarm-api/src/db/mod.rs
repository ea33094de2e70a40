//! Database queries
//!
//! Per-entity query functions over the shared SQLite pool. Schema
//! creation lives in smartfarm-common.

pub mod crops;
pub mod farmers;
pub mod prices;
pub mod suppliers;
pub mod support;
pub mod users;
pub mod yields;

/// Current UTC timestamp in RFC3339, the canonical stored form
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
