//! Farmer profile handlers
//!
//! A profile belongs to one user. Owners may edit everything except the
//! verification flags; staff may edit any profile and are the only ones
//! who can verify.

use crate::api::{AppContext, Pagination};
use crate::db::farmers::{self, ProfileChanges};
use crate::error::{ApiError, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::{ApiEnvelope, Claims};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub region: Option<String>,
    pub district: Option<String>,
    pub ward: Option<Option<String>>,
    pub village: Option<Option<String>>,
    pub phone: Option<String>,
    pub farm_size_ha: Option<f64>,
    pub crops_grown: Option<Vec<String>>,
    pub is_lead_farmer: Option<bool>,
    pub lead_farmer_guid: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub region: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default = "default_true")]
    pub verified: bool,
}

fn default_true() -> bool {
    true
}

fn require_owner_or_staff(claims: &Claims, user_guid: &str) -> Result<()> {
    if claims.sub == user_guid || claims.is_staff() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You may only modify your own profile".to_string(),
        ))
    }
}

fn to_changes(req: ProfileRequest) -> Result<ProfileChanges> {
    if let Some(size) = req.farm_size_ha {
        if !(size.is_finite() && size >= 0.0) {
            return Err(ApiError::field_error(
                "farm_size_ha",
                "Must be a non-negative number.",
            ));
        }
    }
    Ok(ProfileChanges {
        region: req.region,
        district: req.district,
        ward: req.ward,
        village: req.village,
        phone: req.phone,
        farm_size_ha: req.farm_size_ha,
        crops_grown: req.crops_grown,
        is_lead_farmer: req.is_lead_farmer,
        lead_farmer_guid: req.lead_farmer_guid,
    })
}

/// GET /api/v1/farmers
pub async fn list_profiles(
    State(ctx): State<AppContext>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let page = Pagination { limit: query.limit, offset: query.offset };
    let rows = farmers::list_profiles(
        &ctx.db_pool,
        query.region.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(ApiEnvelope::success(
        json!({ "count": rows.len(), "results": rows }),
        "Success",
    )))
}

/// POST /api/v1/farmers
///
/// Creates the caller's own profile. Registration normally does this;
/// the endpoint covers users who registered before choosing the farmer
/// role or whose profile was deleted.
pub async fn create_profile(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    if farmers::get_profile(&ctx.db_pool, &claims.sub).await.is_ok() {
        return Err(ApiError::Conflict("Profile already exists".to_string()));
    }

    farmers::create_default_profile(&ctx.db_pool, &claims.sub).await?;
    let changes = to_changes(req)?;
    let profile = farmers::update_profile(&ctx.db_pool, &claims.sub, &changes).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(json!(profile), "Profile created")),
    ))
}

/// GET /api/v1/farmers/:user_guid
pub async fn get_profile(
    State(ctx): State<AppContext>,
    Path(user_guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let profile = farmers::get_profile(&ctx.db_pool, &user_guid).await?;
    Ok(Json(ApiEnvelope::success(json!(profile), "Success")))
}

/// PUT /api/v1/farmers/:user_guid
pub async fn update_profile(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(user_guid): Path<String>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    require_owner_or_staff(&claims, &user_guid)?;
    let changes = to_changes(req)?;
    let profile = farmers::update_profile(&ctx.db_pool, &user_guid, &changes).await?;
    Ok(Json(ApiEnvelope::success(json!(profile), "Profile updated")))
}

/// POST /api/v1/farmers/:user_guid/verify
pub async fn verify_profile(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(user_guid): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    if !claims.is_staff() {
        return Err(ApiError::Forbidden(
            "Only staff may verify farmer profiles".to_string(),
        ));
    }
    let profile = farmers::set_verified(&ctx.db_pool, &user_guid, req.verified).await?;
    Ok(Json(ApiEnvelope::success(json!(profile), "Profile updated")))
}

/// DELETE /api/v1/farmers/:user_guid
pub async fn delete_profile(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(user_guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    require_owner_or_staff(&claims, &user_guid)?;
    farmers::delete_profile(&ctx.db_pool, &user_guid).await?;
    Ok(Json(ApiEnvelope::success(Value::Null, "Profile deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "u".to_string(),
            role: role.to_string(),
            exp: u64::MAX,
        }
    }

    #[test]
    fn test_owner_or_staff_check() {
        assert!(require_owner_or_staff(&claims("abc", "farmer"), "abc").is_ok());
        assert!(require_owner_or_staff(&claims("abc", "farmer"), "other").is_err());
        assert!(require_owner_or_staff(&claims("abc", "extension_officer"), "other").is_ok());
    }

    #[test]
    fn test_negative_farm_size_rejected() {
        let req = ProfileRequest {
            region: None,
            district: None,
            ward: None,
            village: None,
            phone: None,
            farm_size_ha: Some(-1.0),
            crops_grown: None,
            is_lead_farmer: None,
            lead_farmer_guid: None,
        };
        assert!(matches!(
            to_changes(req).unwrap_err(),
            ApiError::Validation { .. }
        ));
    }
}
