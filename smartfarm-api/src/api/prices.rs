//! Market price handlers
//!
//! Listing is public; posting prices is a staff operation.

use crate::api::{AppContext, Pagination};
use crate::db::crops;
use crate::db::prices::{self, PriceFilters};
use crate::error::{ApiError, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::{ApiEnvelope, Claims};

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    /// Crop guid, or crop name as a fallback
    pub crop: String,
    pub region: String,
    pub price: f64,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub crop: Option<String>,
    pub crop_name: Option<String>,
    pub region: Option<String>,
    pub date_after: Option<String>,
    pub date_before: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_date(field: &str, value: &str) -> Result<()> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ApiError::field_error(field, "Date must be in YYYY-MM-DD format."))
}

/// GET /api/v1/prices
pub async fn list_prices(
    State(ctx): State<AppContext>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    for (field, value) in [
        ("date_after", &query.date_after),
        ("date_before", &query.date_before),
    ] {
        if let Some(value) = value {
            validate_date(field, value)?;
        }
    }

    let filters = PriceFilters {
        crop_guid: query.crop.clone(),
        crop_name: query.crop_name.clone(),
        region: query.region.clone(),
        date_after: query.date_after.clone(),
        date_before: query.date_before.clone(),
    };
    let page = Pagination { limit: query.limit, offset: query.offset };
    let rows = prices::list_prices(&ctx.db_pool, &filters, page.limit(), page.offset()).await?;

    Ok(Json(ApiEnvelope::success(
        json!({ "count": rows.len(), "results": rows }),
        "Success",
    )))
}

/// POST /api/v1/prices
pub async fn create_price(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PriceRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    if !claims.is_staff() {
        return Err(ApiError::Forbidden(
            "Only staff may record market prices".to_string(),
        ));
    }

    if req.region.trim().is_empty() {
        return Err(ApiError::field_error("region", "This field is required."));
    }
    if !(req.price.is_finite() && req.price > 0.0) {
        return Err(ApiError::field_error("price", "Must be a positive number."));
    }
    validate_date("date", &req.date)?;

    let crop = crops::find_crop(&ctx.db_pool, &req.crop)
        .await?
        .ok_or_else(|| ApiError::field_error("crop", format!("Unknown crop '{}'.", req.crop)))?;

    let price = prices::create_price(
        &ctx.db_pool,
        &crop.guid,
        req.region.trim(),
        req.price,
        &req.date,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(json!(price), "Price recorded")),
    ))
}
