//! Supplier directory queries

use crate::db::now_iso;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::Supplier;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Validated supplier payload
#[derive(Debug, Clone)]
pub struct SupplierData {
    pub name: String,
    pub product_list: Vec<serde_json::Value>,
    pub location: String,
    pub phone: String,
}

/// List filters; both are case-insensitive containment matches
#[derive(Debug, Default, Clone)]
pub struct SupplierFilters {
    pub search: Option<String>,
    pub location: Option<String>,
}

pub async fn create_supplier(
    db: &SqlitePool,
    owner_guid: Option<&str>,
    data: &SupplierData,
) -> Result<Supplier> {
    let guid = Uuid::new_v4().to_string();
    let now = now_iso();
    let products = serde_json::to_string(&data.product_list)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO suppliers (guid, owner_guid, name, product_list, location, phone,
                               is_verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(owner_guid)
    .bind(&data.name)
    .bind(&products)
    .bind(&data.location)
    .bind(&data.phone)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    get_supplier(db, &guid).await
}

pub async fn get_supplier(db: &SqlitePool, guid: &str) -> Result<Supplier> {
    sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Supplier {} not found", guid)))
}

pub async fn list_suppliers(
    db: &SqlitePool,
    filters: &SupplierFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<Supplier>> {
    let mut sql = String::from("SELECT * FROM suppliers WHERE 1 = 1");
    if filters.search.is_some() {
        sql.push_str(
            " AND (LOWER(name) LIKE '%' || LOWER(?) || '%'
               OR LOWER(product_list) LIKE '%' || LOWER(?) || '%')",
        );
    }
    if filters.location.is_some() {
        sql.push_str(" AND LOWER(location) LIKE '%' || LOWER(?) || '%'");
    }
    sql.push_str(" ORDER BY name LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, Supplier>(&sql);
    if let Some(search) = &filters.search {
        query = query.bind(search).bind(search);
    }
    if let Some(location) = &filters.location {
        query = query.bind(location);
    }
    query = query.bind(limit).bind(offset);

    Ok(query.fetch_all(db).await?)
}

pub async fn update_supplier(db: &SqlitePool, guid: &str, data: &SupplierData) -> Result<Supplier> {
    let products = serde_json::to_string(&data.product_list)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let result = sqlx::query(
        r#"
        UPDATE suppliers
        SET name = ?, product_list = ?, location = ?, phone = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&data.name)
    .bind(&products)
    .bind(&data.location)
    .bind(&data.phone)
    .bind(now_iso())
    .bind(guid)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Supplier {} not found", guid)));
    }
    get_supplier(db, guid).await
}

/// Mark a supplier verified (staff only, enforced by the handler)
pub async fn set_verified(db: &SqlitePool, guid: &str, verified: bool) -> Result<Supplier> {
    let verified_at = if verified { Some(now_iso()) } else { None };

    let result = sqlx::query(
        "UPDATE suppliers SET is_verified = ?, verified_at = ?, updated_at = ? WHERE guid = ?",
    )
    .bind(verified)
    .bind(verified_at)
    .bind(now_iso())
    .bind(guid)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Supplier {} not found", guid)));
    }
    get_supplier(db, guid).await
}

pub async fn delete_supplier(db: &SqlitePool, guid: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM suppliers WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Supplier {} not found", guid)));
    }
    Ok(())
}
