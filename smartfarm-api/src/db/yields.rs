//! Yield forecast persistence

use crate::db::now_iso;
use crate::domain::forecast::ForecastFactors;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::YieldForecast;
use sqlx::SqlitePool;
use uuid::Uuid;

/// List filters; all are exact matches except crop_name (case-insensitive)
#[derive(Debug, Default, Clone)]
pub struct ForecastFilters {
    pub region: Option<String>,
    pub season: Option<String>,
    pub crop_name: Option<String>,
}

/// Persist one forecast row with its coefficient snapshot
#[allow(clippy::too_many_arguments)]
pub async fn insert_forecast(
    db: &SqlitePool,
    crop_guid: Option<&str>,
    crop_name: &str,
    region: &str,
    season: &str,
    hectares: f64,
    forecast_yield: f64,
    factors: &ForecastFactors,
    method: &str,
) -> Result<YieldForecast> {
    let guid = Uuid::new_v4().to_string();
    let factors_json =
        serde_json::to_string(factors).map_err(|e| ApiError::Internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO yield_forecasts (guid, crop_guid, crop_name, region, season, hectares,
                                     forecast_yield, factors, method, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(crop_guid)
    .bind(crop_name)
    .bind(region)
    .bind(season)
    .bind(hectares)
    .bind(forecast_yield)
    .bind(&factors_json)
    .bind(method)
    .bind(now_iso())
    .execute(db)
    .await?;

    get_forecast(db, &guid).await
}

pub async fn get_forecast(db: &SqlitePool, guid: &str) -> Result<YieldForecast> {
    sqlx::query_as::<_, YieldForecast>("SELECT * FROM yield_forecasts WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Yield forecast {} not found", guid)))
}

pub async fn list_forecasts(
    db: &SqlitePool,
    filters: &ForecastFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<YieldForecast>> {
    let mut sql = String::from("SELECT * FROM yield_forecasts WHERE 1 = 1");
    if filters.region.is_some() {
        sql.push_str(" AND LOWER(region) = LOWER(?)");
    }
    if filters.season.is_some() {
        sql.push_str(" AND season = ?");
    }
    if filters.crop_name.is_some() {
        sql.push_str(" AND LOWER(crop_name) = LOWER(?)");
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, YieldForecast>(&sql);
    if let Some(v) = &filters.region {
        query = query.bind(v);
    }
    if let Some(v) = &filters.season {
        query = query.bind(v);
    }
    if let Some(v) = &filters.crop_name {
        query = query.bind(v);
    }
    query = query.bind(limit).bind(offset);

    Ok(query.fetch_all(db).await?)
}
