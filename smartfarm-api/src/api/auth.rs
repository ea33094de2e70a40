//! Registration, login, and current-user handlers

use crate::api::AppContext;
use crate::db::{farmers, users};
use crate::error::{ApiError, Result};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::{hash_password, issue_token, verify_password, ApiEnvelope, Claims};
use smartfarm_common::db::models::Role;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Username or email address
    pub username: String,
    pub password: String,
}

fn validate_registration(req: &RegisterRequest) -> Result<Role> {
    if req.username.trim().is_empty() {
        return Err(ApiError::field_error("username", "This field is required."));
    }
    if !req.email.contains('@') {
        return Err(ApiError::field_error("email", "Enter a valid email address."));
    }
    if req.password.len() < 8 {
        return Err(ApiError::field_error(
            "password",
            "Password must be at least 8 characters.",
        ));
    }

    match req.role.as_deref() {
        None => Ok(Role::Farmer),
        Some(value) => Role::parse(value)
            .ok_or_else(|| ApiError::field_error("role", format!("'{}' is not a valid role.", value))),
    }
}

/// POST /api/v1/auth/register
///
/// Creates the user and, for the farmer role, an empty farmer profile.
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    let role = validate_registration(&req)?;
    let password_hash = hash_password(&req.password)?;

    let user = users::create_user(
        &ctx.db_pool,
        req.username.trim(),
        req.email.trim(),
        &password_hash,
        req.phone.as_deref(),
        role.as_str(),
    )
    .await?;

    if role == Role::Farmer {
        farmers::create_default_profile(&ctx.db_pool, &user.guid).await?;
    }

    let guid = Uuid::parse_str(&user.guid).map_err(|e| ApiError::Internal(e.to_string()))?;
    let token = issue_token(&ctx.jwt_secret, guid, &user.username, &user.role)?;

    info!("Registered user {} ({})", user.username, user.role);

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(
            json!({ "user": user, "token": token }),
            "Account created",
        )),
    ))
}

/// POST /api/v1/auth/token
pub async fn token(
    State(ctx): State<AppContext>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let user = users::get_user_by_login(&ctx.db_pool, req.username.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }
    verify_password(&req.password, &user.password_hash)?;

    let guid = Uuid::parse_str(&user.guid).map_err(|e| ApiError::Internal(e.to_string()))?;
    let token = issue_token(&ctx.jwt_secret, guid, &user.username, &user.role)?;

    Ok(Json(ApiEnvelope::success(
        json!({ "token": token, "user": user }),
        "Authenticated",
    )))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let user = users::get_user_by_guid(&ctx.db_pool, &claims.sub).await?;

    // Farmers carry their profile inline; other roles have none
    let profile = match user.role.as_str() {
        "farmer" => farmers::get_profile(&ctx.db_pool, &user.guid).await.ok(),
        _ => None,
    };

    Ok(Json(ApiEnvelope::success(
        json!({ "user": user, "profile": profile }),
        "Success",
    )))
}
