//! Crop catalogue handlers
//!
//! Reads are public. Writes are limited to agronomists and admins.

use crate::api::{AppContext, Pagination};
use crate::db::crops::{self, CropData, CropFilters};
use crate::error::{ApiError, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::{ApiEnvelope, Claims};
use smartfarm_common::db::models::Season;

#[derive(Debug, Deserialize)]
pub struct CropRequest {
    pub name: String,
    pub season: String,
    pub soil_type: String,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub recommended_inputs: Option<Value>,
    pub maturity_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct CropQuery {
    pub region: Option<String>,
    pub season: Option<String>,
    pub soil_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn require_crop_manager(claims: &Claims) -> Result<()> {
    match claims.role.as_str() {
        "agronomist" | "admin" => Ok(()),
        _ => Err(ApiError::Forbidden(
            "Only agronomists and admins may manage crops".to_string(),
        )),
    }
}

fn validate_crop(req: CropRequest) -> Result<CropData> {
    if req.name.trim().is_empty() {
        return Err(ApiError::field_error("name", "This field is required."));
    }
    let season = Season::parse(&req.season).ok_or_else(|| {
        ApiError::field_error("season", format!("'{}' is not a valid season.", req.season))
    })?;
    if req.maturity_days < 1 {
        return Err(ApiError::field_error(
            "maturity_days",
            "Must be a positive number of days.",
        ));
    }
    let recommended_inputs = match req.recommended_inputs {
        None | Some(Value::Null) => serde_json::Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ApiError::field_error(
                "recommended_inputs",
                "Must be a JSON object.",
            ))
        }
    };

    Ok(CropData {
        name: req.name.trim().to_string(),
        season,
        soil_type: req.soil_type.trim().to_lowercase(),
        regions: req.regions,
        recommended_inputs,
        maturity_days: req.maturity_days,
    }
    .normalize())
}

/// GET /api/v1/crops
pub async fn list_crops(
    State(ctx): State<AppContext>,
    Query(query): Query<CropQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let season = match &query.season {
        Some(value) => Some(Season::parse(value).ok_or_else(|| {
            ApiError::field_error("season", format!("'{}' is not a valid season.", value))
        })?),
        None => None,
    };
    let filters = CropFilters {
        region: query.region.clone(),
        season,
        soil_type: query.soil_type.clone(),
    };

    let page = Pagination { limit: query.limit, offset: query.offset };
    let rows = crops::list_crops(&ctx.db_pool, &filters, page.limit(), page.offset()).await?;
    Ok(Json(ApiEnvelope::success(
        json!({ "count": rows.len(), "results": rows }),
        "Success",
    )))
}

/// GET /api/v1/crops/:guid
pub async fn get_crop(
    State(ctx): State<AppContext>,
    Path(guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let crop = crops::get_crop(&ctx.db_pool, &guid).await?;
    Ok(Json(ApiEnvelope::success(json!(crop), "Success")))
}

/// POST /api/v1/crops
pub async fn create_crop(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CropRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    require_crop_manager(&claims)?;
    let data = validate_crop(req)?;
    let crop = crops::create_crop(&ctx.db_pool, &data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(json!(crop), "Crop created")),
    ))
}

/// PUT /api/v1/crops/:guid
pub async fn update_crop(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
    Json(req): Json<CropRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    require_crop_manager(&claims)?;
    let data = validate_crop(req)?;
    let crop = crops::update_crop(&ctx.db_pool, &guid, &data).await?;
    Ok(Json(ApiEnvelope::success(json!(crop), "Crop updated")))
}

/// DELETE /api/v1/crops/:guid
pub async fn delete_crop(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    require_crop_manager(&claims)?;
    crops::delete_crop(&ctx.db_pool, &guid).await?;
    Ok(Json(ApiEnvelope::success(Value::Null, "Crop deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farmer_claims() -> Claims {
        Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            username: "amina".to_string(),
            role: "farmer".to_string(),
            exp: u64::MAX,
        }
    }

    fn maize_request() -> CropRequest {
        CropRequest {
            name: "Maize".to_string(),
            season: "major".to_string(),
            soil_type: "Loamy".to_string(),
            regions: vec!["Nairobi".to_string(), "  ".to_string()],
            recommended_inputs: Some(json!({"fertilizer": "NPK"})),
            maturity_days: 120,
        }
    }

    #[test]
    fn test_farmer_cannot_manage_crops() {
        assert!(matches!(
            require_crop_manager(&farmer_claims()).unwrap_err(),
            ApiError::Forbidden(_)
        ));

        let mut staff = farmer_claims();
        staff.role = "agronomist".to_string();
        assert!(require_crop_manager(&staff).is_ok());
    }

    #[test]
    fn test_validate_normalizes() {
        let data = validate_crop(maize_request()).unwrap();
        assert_eq!(data.soil_type, "loamy");
        assert_eq!(data.regions, vec!["Nairobi"]);
        assert_eq!(data.recommended_inputs["fertilizer"], "NPK");
    }

    #[test]
    fn test_inputs_must_be_object() {
        let mut req = maize_request();
        req.recommended_inputs = Some(json!(["NPK"]));
        assert!(matches!(
            validate_crop(req).unwrap_err(),
            ApiError::Validation { .. }
        ));
    }

    #[test]
    fn test_bad_season_and_maturity_rejected() {
        let mut req = maize_request();
        req.season = "winter".to_string();
        assert!(validate_crop(req).is_err());

        let mut req = maize_request();
        req.maturity_days = 0;
        assert!(validate_crop(req).is_err());
    }
}
