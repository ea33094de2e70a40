//! Crop catalogue queries

use crate::db::now_iso;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::{Crop, Season};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Validated crop payload ready for insert/update
#[derive(Debug, Clone)]
pub struct CropData {
    pub name: String,
    pub season: Season,
    pub soil_type: String,
    pub regions: Vec<String>,
    pub recommended_inputs: serde_json::Map<String, serde_json::Value>,
    pub maturity_days: i64,
}

impl CropData {
    /// Strip blank region entries, mirroring the model-level clean step
    pub fn normalize(mut self) -> Self {
        self.regions = self
            .regions
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        self
    }
}

/// List filters for the crop catalogue
#[derive(Debug, Default, Clone)]
pub struct CropFilters {
    pub region: Option<String>,
    pub season: Option<Season>,
    pub soil_type: Option<String>,
}

pub async fn create_crop(db: &SqlitePool, data: &CropData) -> Result<Crop> {
    let guid = Uuid::new_v4().to_string();
    let now = now_iso();
    let regions = serde_json::to_string(&data.regions)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let inputs = serde_json::to_string(&data.recommended_inputs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let result = sqlx::query(
        r#"
        INSERT INTO crops (guid, name, season, soil_type, regions, recommended_inputs,
                           maturity_days, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(&data.name)
    .bind(data.season.as_str())
    .bind(&data.soil_type)
    .bind(&regions)
    .bind(&inputs)
    .bind(data.maturity_days)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await;

    match result {
        Ok(_) => get_crop(db, &guid).await,
        Err(e) if crate::db::users::is_unique_violation(&e) => Err(ApiError::Conflict(format!(
            "A crop named '{}' already exists",
            data.name
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_crop(db: &SqlitePool, guid: &str) -> Result<Crop> {
    sqlx::query_as::<_, Crop>("SELECT * FROM crops WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Crop {} not found", guid)))
}

/// Find a crop by guid first, then by case-insensitive name
pub async fn find_crop(db: &SqlitePool, guid_or_name: &str) -> Result<Option<Crop>> {
    if Uuid::parse_str(guid_or_name).is_ok() {
        if let Some(crop) = sqlx::query_as::<_, Crop>("SELECT * FROM crops WHERE guid = ?")
            .bind(guid_or_name)
            .fetch_optional(db)
            .await?
        {
            return Ok(Some(crop));
        }
    }

    let crop = sqlx::query_as::<_, Crop>("SELECT * FROM crops WHERE LOWER(name) = LOWER(?)")
        .bind(guid_or_name)
        .fetch_optional(db)
        .await?;
    Ok(crop)
}

pub async fn list_crops(
    db: &SqlitePool,
    filters: &CropFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<Crop>> {
    // The regions column holds a JSON array; containment on the lowered
    // text is the list-endpoint filter. Membership is re-checked in Rust
    // where exactness matters (recommendations).
    let mut sql = String::from("SELECT * FROM crops WHERE 1 = 1");
    if filters.region.is_some() {
        sql.push_str(" AND LOWER(regions) LIKE '%' || LOWER(?) || '%'");
    }
    if filters.season.is_some() {
        sql.push_str(" AND season = ?");
    }
    if filters.soil_type.is_some() {
        sql.push_str(" AND LOWER(soil_type) = LOWER(?)");
    }
    sql.push_str(" ORDER BY name LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, Crop>(&sql);
    if let Some(region) = &filters.region {
        query = query.bind(region);
    }
    if let Some(season) = filters.season {
        query = query.bind(season.as_str());
    }
    if let Some(soil) = &filters.soil_type {
        query = query.bind(soil);
    }
    query = query.bind(limit).bind(offset);

    Ok(query.fetch_all(db).await?)
}

pub async fn update_crop(db: &SqlitePool, guid: &str, data: &CropData) -> Result<Crop> {
    let regions = serde_json::to_string(&data.regions)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let inputs = serde_json::to_string(&data.recommended_inputs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let result = sqlx::query(
        r#"
        UPDATE crops
        SET name = ?, season = ?, soil_type = ?, regions = ?,
            recommended_inputs = ?, maturity_days = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&data.name)
    .bind(data.season.as_str())
    .bind(&data.soil_type)
    .bind(&regions)
    .bind(&inputs)
    .bind(data.maturity_days)
    .bind(now_iso())
    .bind(guid)
    .execute(db)
    .await;

    match result {
        Ok(r) if r.rows_affected() == 0 => {
            Err(ApiError::NotFound(format!("Crop {} not found", guid)))
        }
        Ok(_) => get_crop(db, guid).await,
        Err(e) if crate::db::users::is_unique_violation(&e) => Err(ApiError::Conflict(format!(
            "A crop named '{}' already exists",
            data.name
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_crop(db: &SqlitePool, guid: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM crops WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Crop {} not found", guid)));
    }
    Ok(())
}
