//! Bearer token middleware
//!
//! Validates the `Authorization: Bearer <jwt>` header on protected routes
//! and inserts the decoded [`Claims`] into request extensions so handlers
//! can extract them with `Extension<Claims>`.

use crate::api::AppContext;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use smartfarm_common::api::{validate_token, Claims};

/// Pull the bearer token out of the Authorization header
fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Malformed Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))
}

pub async fn require_auth(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)?;
    let claims: Claims = validate_token(&ctx.jwt_secret, token)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
