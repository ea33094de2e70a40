//! Domain logic
//!
//! The deterministic formulas behind the recommendation and yield
//! forecast endpoints. Pure functions over static coefficient tables.

pub mod forecast;
pub mod recommend;
