//! Supplier directory handlers
//!
//! Browsing is public. Creating attaches the caller as owner; only the
//! owner or staff may update or delete an entry.

use crate::api::{AppContext, Pagination};
use crate::db::suppliers::{self, SupplierData, SupplierFilters};
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
pub struct SupplierRequest {
    pub name: String,
    #[serde(default)]
    pub product_list: Option<Value>,
    pub location: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default = "default_true")]
    pub verified: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SupplierQuery {
    pub search: Option<String>,
    /// Short alias for `search`
    pub q: Option<String>,
    pub location: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_supplier(req: SupplierRequest) -> Result<SupplierData> {
    if req.name.trim().is_empty() {
        return Err(ApiError::field_error("name", "This field is required."));
    }
    if req.location.trim().is_empty() {
        return Err(ApiError::field_error("location", "This field is required."));
    }
    let product_list = match req.product_list {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ApiError::field_error(
                "product_list",
                "Must be a JSON array.",
            ))
        }
    };

    Ok(SupplierData {
        name: req.name.trim().to_string(),
        product_list,
        location: req.location.trim().to_string(),
        phone: req.phone.trim().to_string(),
    })
}

async fn require_supplier_access(
    ctx: &AppContext,
    claims: &Claims,
    guid: &str,
) -> Result<()> {
    let supplier = suppliers::get_supplier(&ctx.db_pool, guid).await?;
    let is_owner = supplier.owner_guid.as_deref() == Some(claims.sub.as_str());
    if is_owner || claims.is_staff() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You may only modify your own supplier entries".to_string(),
        ))
    }
}

/// GET /api/v1/suppliers
pub async fn list_suppliers(
    State(ctx): State<AppContext>,
    Query(query): Query<SupplierQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let filters = SupplierFilters {
        search: query.search.clone().or_else(|| query.q.clone()),
        location: query.location.clone(),
    };
    let page = Pagination { limit: query.limit, offset: query.offset };
    let rows = suppliers::list_suppliers(&ctx.db_pool, &filters, page.limit(), page.offset())
        .await?;
    Ok(Json(ApiEnvelope::success(
        json!({ "count": rows.len(), "results": rows }),
        "Success",
    )))
}

/// GET /api/v1/suppliers/:guid
pub async fn get_supplier(
    State(ctx): State<AppContext>,
    Path(guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let supplier = suppliers::get_supplier(&ctx.db_pool, &guid).await?;
    Ok(Json(ApiEnvelope::success(json!(supplier), "Success")))
}

/// POST /api/v1/suppliers
pub async fn create_supplier(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SupplierRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    let data = validate_supplier(req)?;
    let supplier = suppliers::create_supplier(&ctx.db_pool, Some(&claims.sub), &data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(json!(supplier), "Supplier created")),
    ))
}

/// PUT /api/v1/suppliers/:guid
pub async fn update_supplier(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
    Json(req): Json<SupplierRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    require_supplier_access(&ctx, &claims, &guid).await?;
    let data = validate_supplier(req)?;
    let supplier = suppliers::update_supplier(&ctx.db_pool, &guid, &data).await?;
    Ok(Json(ApiEnvelope::success(json!(supplier), "Supplier updated")))
}

/// POST /api/v1/suppliers/:guid/verify
pub async fn verify_supplier(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    if !claims.is_staff() {
        return Err(ApiError::Forbidden(
            "Only staff may verify suppliers".to_string(),
        ));
    }
    let supplier = suppliers::set_verified(&ctx.db_pool, &guid, req.verified).await?;
    Ok(Json(ApiEnvelope::success(json!(supplier), "Supplier updated")))
}

/// DELETE /api/v1/suppliers/:guid
pub async fn delete_supplier(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    require_supplier_access(&ctx, &claims, &guid).await?;
    suppliers::delete_supplier(&ctx.db_pool, &guid).await?;
    Ok(Json(ApiEnvelope::success(Value::Null, "Supplier deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SupplierRequest {
        SupplierRequest {
            name: " Kilimo Agrovet ".to_string(),
            product_list: Some(json!([{"name": "NPK", "unit": "50kg"}])),
            location: "Nakuru".to_string(),
            phone: "+254700000001".to_string(),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let data = validate_supplier(request()).unwrap();
        assert_eq!(data.name, "Kilimo Agrovet");
        assert_eq!(data.product_list.len(), 1);
    }

    #[test]
    fn test_product_list_must_be_array() {
        let mut req = request();
        req.product_list = Some(json!({"name": "NPK"}));
        assert!(matches!(
            validate_supplier(req).unwrap_err(),
            ApiError::Validation { .. }
        ));
    }

    #[test]
    fn test_missing_name_rejected() {
        let mut req = request();
        req.name = "  ".to_string();
        assert!(validate_supplier(req).is_err());
    }
}
