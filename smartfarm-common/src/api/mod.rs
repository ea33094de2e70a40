//! API module for shared HTTP API functionality
//!
//! Provides the response envelope and authentication primitives used by
//! the SmartFarm HTTP service.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Database operations (via sqlx)
//! - Shared types
//!
//! The service crate wraps these with Axum-specific middleware.

pub mod auth;
pub mod types;

pub use auth::{
    hash_password, issue_token, load_jwt_secret, validate_token, verify_password, ApiAuthError,
    Claims,
};
pub use types::{ApiEnvelope, ErrorBody};
