//! Market price queries

use crate::db::now_iso;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::MarketPrice;
use sqlx::SqlitePool;
use uuid::Uuid;

/// List filters for price queries; dates are inclusive ISO dates
#[derive(Debug, Default, Clone)]
pub struct PriceFilters {
    pub crop_guid: Option<String>,
    pub crop_name: Option<String>,
    pub region: Option<String>,
    pub date_after: Option<String>,
    pub date_before: Option<String>,
}

pub async fn create_price(
    db: &SqlitePool,
    crop_guid: &str,
    region: &str,
    price: f64,
    date: &str,
) -> Result<MarketPrice> {
    let guid = Uuid::new_v4().to_string();
    let now = now_iso();

    sqlx::query(
        r#"
        INSERT INTO market_prices (guid, crop_guid, region, price, date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(crop_guid)
    .bind(region)
    .bind(price)
    .bind(date)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    sqlx::query_as::<_, MarketPrice>("SELECT * FROM market_prices WHERE guid = ?")
        .bind(&guid)
        .fetch_one(db)
        .await
        .map_err(ApiError::from)
}

/// List prices newest-first with optional filters
pub async fn list_prices(
    db: &SqlitePool,
    filters: &PriceFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<MarketPrice>> {
    let mut sql = String::from(
        "SELECT p.* FROM market_prices p JOIN crops c ON c.guid = p.crop_guid WHERE 1 = 1",
    );
    if filters.crop_guid.is_some() {
        sql.push_str(" AND p.crop_guid = ?");
    }
    if filters.crop_name.is_some() {
        sql.push_str(" AND LOWER(c.name) = LOWER(?)");
    }
    if filters.region.is_some() {
        sql.push_str(" AND LOWER(p.region) = LOWER(?)");
    }
    if filters.date_after.is_some() {
        sql.push_str(" AND p.date >= ?");
    }
    if filters.date_before.is_some() {
        sql.push_str(" AND p.date <= ?");
    }
    sql.push_str(" ORDER BY p.date DESC, p.rowid DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, MarketPrice>(&sql);
    if let Some(v) = &filters.crop_guid {
        query = query.bind(v);
    }
    if let Some(v) = &filters.crop_name {
        query = query.bind(v);
    }
    if let Some(v) = &filters.region {
        query = query.bind(v);
    }
    if let Some(v) = &filters.date_after {
        query = query.bind(v);
    }
    if let Some(v) = &filters.date_before {
        query = query.bind(v);
    }
    query = query.bind(limit).bind(offset);

    Ok(query.fetch_all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::crops::{create_crop, CropData};
    use smartfarm_common::db::init_memory_database;
    use smartfarm_common::db::models::Season;

    async fn setup() -> (SqlitePool, String, String) {
        let db = init_memory_database().await.unwrap();
        let maize = create_crop(
            &db,
            &CropData {
                name: "Maize".to_string(),
                season: Season::Major,
                soil_type: "loamy".to_string(),
                regions: vec!["Nairobi".to_string()],
                recommended_inputs: serde_json::Map::new(),
                maturity_days: 120,
            },
        )
        .await
        .unwrap();
        let beans = create_crop(
            &db,
            &CropData {
                name: "Beans".to_string(),
                season: Season::Major,
                soil_type: "clay".to_string(),
                regions: vec!["Mombasa".to_string()],
                recommended_inputs: serde_json::Map::new(),
                maturity_days: 100,
            },
        )
        .await
        .unwrap();
        (db, maize.guid, beans.guid)
    }

    #[tokio::test]
    async fn test_list_ordered_by_date_desc() {
        let (db, maize, _) = setup().await;

        create_price(&db, &maize, "Nairobi", 100.50, "2026-08-20").await.unwrap();
        create_price(&db, &maize, "Nairobi", 101.00, "2026-08-22").await.unwrap();
        create_price(&db, &maize, "Kisumu", 98.75, "2026-08-21").await.unwrap();

        let all = list_prices(&db, &PriceFilters::default(), 50, 0).await.unwrap();
        let dates: Vec<&str> = all.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-22", "2026-08-21", "2026-08-20"]);
    }

    #[tokio::test]
    async fn test_filters() {
        let (db, maize, beans) = setup().await;

        create_price(&db, &maize, "Nairobi", 100.0, "2026-08-20").await.unwrap();
        create_price(&db, &maize, "Kisumu", 98.0, "2026-08-21").await.unwrap();
        create_price(&db, &beans, "Mombasa", 80.0, "2026-08-19").await.unwrap();

        let by_crop = list_prices(
            &db,
            &PriceFilters {
                crop_guid: Some(maize.clone()),
                ..Default::default()
            },
            50,
            0,
        )
        .await
        .unwrap();
        assert_eq!(by_crop.len(), 2);

        let by_name = list_prices(
            &db,
            &PriceFilters {
                crop_name: Some("beans".to_string()),
                ..Default::default()
            },
            50,
            0,
        )
        .await
        .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].region, "Mombasa");

        let in_window = list_prices(
            &db,
            &PriceFilters {
                date_after: Some("2026-08-20".to_string()),
                date_before: Some("2026-08-20".to_string()),
                ..Default::default()
            },
            50,
            0,
        )
        .await
        .unwrap();
        assert_eq!(in_window.len(), 1);
        assert_eq!(in_window[0].date, "2026-08-20");
    }
}
