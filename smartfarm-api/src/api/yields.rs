//! Yield forecast handlers
//!
//! The forecast endpoint computes the deterministic mock yield, persists
//! the row with its coefficient snapshot, and broadcasts a
//! `ForecastCreated` event. Hectares and yield are rendered as 2-decimal
//! strings so clients get stable formatting.

use crate::api::{AppContext, Pagination};
use crate::db::{crops, yields};
use crate::domain::forecast::{compute_forecast, lookup_factors, METHOD_MOCK_V1};
use crate::error::{ApiError, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::ApiEnvelope;
use smartfarm_common::db::models::{Season, YieldForecast};
use smartfarm_common::events::SmartfarmEvent;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Crop guid or name
    pub crop: Option<String>,
    pub region: Option<String>,
    pub season: Option<String>,
    pub hectares: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastListQuery {
    pub region: Option<String>,
    pub season: Option<String>,
    pub crop_name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::field_error(field, "This field is required.")),
    }
}

fn parse_hectares(raw: &str) -> Result<f64> {
    let hectares: f64 = raw
        .parse()
        .map_err(|_| ApiError::field_error("hectares", "Must be a number."))?;
    if !(hectares.is_finite() && hectares > 0.0) {
        return Err(ApiError::field_error("hectares", "Must be a positive number."));
    }
    Ok(hectares)
}

fn forecast_payload(row: &YieldForecast) -> Result<Value> {
    let factors: Value = serde_json::from_str(&row.factors)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(json!({
        "guid": row.guid,
        "crop_guid": row.crop_guid,
        "crop_name": row.crop_name,
        "region": row.region,
        "season": row.season,
        "hectares": format!("{:.2}", row.hectares),
        "forecast_yield": format!("{:.2}", row.forecast_yield),
        "factors": factors,
        "method": row.method,
        "created_at": row.created_at,
    }))
}

/// GET /api/v1/yields/forecast
pub async fn forecast(
    State(ctx): State<AppContext>,
    Query(query): Query<ForecastQuery>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    let crop_param = required("crop", &query.crop)?;
    let region = required("region", &query.region)?;
    let season_param = required("season", &query.season)?;
    let hectares = parse_hectares(required("hectares", &query.hectares)?)?;

    let season = Season::parse(season_param).ok_or_else(|| {
        ApiError::field_error("season", format!("'{}' is not a valid season.", season_param))
    })?;

    // The catalogue row is optional; the coefficient table is what gates
    // which crops can be forecast
    let catalogue_crop = crops::find_crop(&ctx.db_pool, crop_param).await?;
    let crop_name = catalogue_crop
        .as_ref()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| crop_param.to_string());

    let factors = lookup_factors(&crop_name, region, season).ok_or_else(|| {
        ApiError::field_error(
            "crop",
            format!("No yield model for '{}' in '{}'.", crop_name, region),
        )
    })?;
    let forecast_yield = compute_forecast(&factors, hectares);

    let row = yields::insert_forecast(
        &ctx.db_pool,
        catalogue_crop.as_ref().map(|c| c.guid.as_str()),
        &crop_name,
        region,
        season.as_str(),
        hectares,
        forecast_yield,
        &factors,
        METHOD_MOCK_V1,
    )
    .await?;

    if let Ok(forecast_id) = Uuid::parse_str(&row.guid) {
        ctx.state.broadcast_event(SmartfarmEvent::ForecastCreated {
            forecast_id,
            crop_name: row.crop_name.clone(),
            region: row.region.clone(),
            timestamp: chrono::Utc::now(),
        });
    }

    info!(
        "Forecast {}: {} in {} over {} ha -> {} t",
        row.guid, row.crop_name, row.region, row.hectares, row.forecast_yield
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(forecast_payload(&row)?, "Forecast computed")),
    ))
}

/// GET /api/v1/yields
pub async fn list_forecasts(
    State(ctx): State<AppContext>,
    Query(query): Query<ForecastListQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    if let Some(season) = &query.season {
        Season::parse(season).ok_or_else(|| {
            ApiError::field_error("season", format!("'{}' is not a valid season.", season))
        })?;
    }

    let filters = yields::ForecastFilters {
        region: query.region.clone(),
        season: query.season.clone(),
        crop_name: query.crop_name.clone(),
    };
    let page = Pagination { limit: query.limit, offset: query.offset };
    let rows = yields::list_forecasts(&ctx.db_pool, &filters, page.limit(), page.offset()).await?;
    let results = rows
        .iter()
        .map(forecast_payload)
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(ApiEnvelope::success(
        json!({ "count": results.len(), "results": results }),
        "Success",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::ForecastFactors;

    #[test]
    fn test_required_rejects_blank() {
        assert!(required("crop", &Some("  ".to_string())).is_err());
        assert!(required("crop", &None).is_err());
        assert_eq!(required("crop", &Some(" Maize ".to_string())).unwrap(), "Maize");
    }

    #[test]
    fn test_hectares_validation() {
        assert_eq!(parse_hectares("2.5").unwrap(), 2.5);
        assert!(parse_hectares("0").is_err());
        assert!(parse_hectares("-1").is_err());
        assert!(parse_hectares("two").is_err());
    }

    #[test]
    fn test_payload_formats_two_decimals() {
        let row = YieldForecast {
            guid: Uuid::new_v4().to_string(),
            crop_guid: None,
            crop_name: "Maize".to_string(),
            region: "Nairobi".to_string(),
            season: "major".to_string(),
            hectares: 2.5,
            forecast_yield: 9.0,
            factors: serde_json::to_string(&ForecastFactors {
                base_yield_t_per_ha: 4.0,
                regional_multiplier: 0.9,
                season_factor: 1.0,
            })
            .unwrap(),
            method: METHOD_MOCK_V1.to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let payload = forecast_payload(&row).unwrap();
        assert_eq!(payload["hectares"], "2.50");
        assert_eq!(payload["forecast_yield"], "9.00");
        assert_eq!(payload["factors"]["base_yield_t_per_ha"], 4.0);
    }
}
