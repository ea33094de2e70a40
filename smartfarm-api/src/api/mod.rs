//! HTTP API
//!
//! Router assembly and request handlers. The surface is a conventional
//! versioned REST API under `/api/v1` plus a WebSocket telemetry
//! endpoint at `/ws/:client_id`.

pub mod auth;
pub mod auth_middleware;
pub mod crops;
pub mod farmers;
pub mod prices;
pub mod recommendations;
pub mod suppliers;
pub mod support;
pub mod ws;
pub mod yields;

use crate::state::SharedState;
use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
///
/// **Note:** AppContext implements Clone, which gives us `FromRef<AppContext>`
/// for free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: SqlitePool,
    pub state: Arc<SharedState>,
    /// JWT signing secret, loaded from the settings table at startup
    pub jwt_secret: String,
}

/// limit/offset query parameters shared by list endpoints
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

/// GET /health - Health check endpoint (no envelope, no auth)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "smartfarm_api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the application router
pub fn create_router(ctx: AppContext) -> Router {
    // Routes reachable without a bearer token
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/token", post(auth::token))
        .route("/api/v1/crops", get(crops::list_crops))
        .route("/api/v1/crops/:guid", get(crops::get_crop))
        .route("/api/v1/prices", get(prices::list_prices))
        .route("/api/v1/suppliers", get(suppliers::list_suppliers))
        .route("/api/v1/suppliers/:guid", get(suppliers::get_supplier))
        .route("/api/v1/recommendations", get(recommendations::recommend))
        .route("/api/v1/yields/forecast", get(yields::forecast))
        .route("/api/v1/yields", get(yields::list_forecasts))
        .route("/ws/:client_id", get(ws::websocket_handler));

    // Everything else requires a valid token; role checks live in handlers
    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/crops", post(crops::create_crop))
        .route("/api/v1/crops/:guid", put(crops::update_crop))
        .route("/api/v1/crops/:guid", delete(crops::delete_crop))
        .route("/api/v1/prices", post(prices::create_price))
        .route("/api/v1/farmers", get(farmers::list_profiles))
        .route("/api/v1/farmers", post(farmers::create_profile))
        .route("/api/v1/farmers/:user_guid", get(farmers::get_profile))
        .route("/api/v1/farmers/:user_guid", put(farmers::update_profile))
        .route("/api/v1/farmers/:user_guid", delete(farmers::delete_profile))
        .route("/api/v1/farmers/:user_guid/verify", post(farmers::verify_profile))
        .route("/api/v1/suppliers", post(suppliers::create_supplier))
        .route("/api/v1/suppliers/:guid", put(suppliers::update_supplier))
        .route("/api/v1/suppliers/:guid", delete(suppliers::delete_supplier))
        .route("/api/v1/suppliers/:guid/verify", post(suppliers::verify_supplier))
        .route("/api/v1/support", get(support::list_requests))
        .route("/api/v1/support", post(support::create_request))
        .route("/api/v1/support/:guid", get(support::get_request))
        .route("/api/v1/support/:guid", patch(support::update_request))
        .route("/api/v1/support/:guid", delete(support::delete_request))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth_middleware::require_auth,
        ));

    public
        .merge(protected)
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let p = Pagination { limit: None, offset: None };
        assert_eq!(p.limit(), 50);
        assert_eq!(p.offset(), 0);

        let p = Pagination { limit: Some(10_000), offset: Some(-5) };
        assert_eq!(p.limit(), 200);
        assert_eq!(p.offset(), 0);

        let p = Pagination { limit: Some(0), offset: Some(25) };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 25);
    }
}
