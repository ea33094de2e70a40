//! Help request (support ticket) handlers
//!
//! Access rules:
//! - Farmers see and fully edit their own tickets, and only the owner
//!   may delete one.
//! - Staff see every ticket but may only change its status.
//!
//! Status changes are broadcast to telemetry subscribers.

use crate::api::AppContext;
use crate::db::support;
use crate::error::{ApiError, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::{ApiEnvelope, Claims};
use smartfarm_common::db::models::{HelpRequest, HelpStatus};
use smartfarm_common::events::SmartfarmEvent;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub status: Option<String>,
}

fn parse_status(value: &str) -> Result<HelpStatus> {
    HelpStatus::parse(value).ok_or_else(|| {
        ApiError::field_error("status", format!("'{}' is not a valid status.", value))
    })
}

fn require_ticket_access(claims: &Claims, ticket: &HelpRequest) -> Result<()> {
    if claims.sub == ticket.user_guid || claims.is_staff() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You may only access your own help requests".to_string(),
        ))
    }
}

/// GET /api/v1/support
pub async fn list_requests(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;

    // Staff see the full queue; everyone else only their own tickets
    let owner = if claims.is_staff() {
        None
    } else {
        Some(claims.sub.as_str())
    };
    let rows = support::list_requests(&ctx.db_pool, owner, status).await?;

    Ok(Json(ApiEnvelope::success(
        json!({ "count": rows.len(), "results": rows }),
        "Success",
    )))
}

/// POST /api/v1/support
pub async fn create_request(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Value>>)> {
    if req.message.trim().is_empty() {
        return Err(ApiError::field_error("message", "This field is required."));
    }

    let ticket = support::create_request(&ctx.db_pool, &claims.sub, req.message.trim()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::success(json!(ticket), "Help request created")),
    ))
}

/// GET /api/v1/support/:guid
pub async fn get_request(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let ticket = support::get_request(&ctx.db_pool, &guid).await?;
    require_ticket_access(&claims, &ticket)?;
    Ok(Json(ApiEnvelope::success(json!(ticket), "Success")))
}

/// PATCH /api/v1/support/:guid
pub async fn update_request(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let ticket = support::get_request(&ctx.db_pool, &guid).await?;
    require_ticket_access(&claims, &ticket)?;

    let is_owner = claims.sub == ticket.user_guid;
    if !is_owner && req.message.is_some() {
        return Err(ApiError::bad_request(
            "Staff may only update the status of a help request",
        ));
    }

    let status = req.status.as_deref().map(parse_status).transpose()?;
    let status_changed = status.map(|s| s.as_str() != ticket.status).unwrap_or(false);

    let updated =
        support::update_request(&ctx.db_pool, &guid, req.message.as_deref(), status).await?;

    if status_changed {
        if let Ok(ticket_id) = Uuid::parse_str(&updated.guid) {
            ctx.state.broadcast_event(SmartfarmEvent::TicketStatusChanged {
                ticket_id,
                status: updated.status.clone(),
                timestamp: chrono::Utc::now(),
            });
        }
    }

    Ok(Json(ApiEnvelope::success(json!(updated), "Help request updated")))
}

/// DELETE /api/v1/support/:guid
pub async fn delete_request(
    State(ctx): State<AppContext>,
    Extension(claims): Extension<Claims>,
    Path(guid): Path<String>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let ticket = support::get_request(&ctx.db_pool, &guid).await?;

    // Deletion is reserved for the ticket owner, staff included
    if claims.sub != ticket.user_guid {
        return Err(ApiError::Forbidden(
            "Only the owner may delete a help request".to_string(),
        ));
    }

    support::delete_request(&ctx.db_pool, &guid).await?;
    Ok(Json(ApiEnvelope::success(Value::Null, "Help request deleted")))
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

    fn ticket(owner: &str) -> HelpRequest {
        HelpRequest {
            guid: Uuid::new_v4().to_string(),
            user_guid: owner.to_string(),
            message: "m".to_string(),
            status: "open".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_access_rules() {
        let t = ticket("owner-guid");
        assert!(require_ticket_access(&claims("owner-guid", "farmer"), &t).is_ok());
        assert!(require_ticket_access(&claims("other", "farmer"), &t).is_err());
        assert!(require_ticket_access(&claims("other", "agronomist"), &t).is_ok());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(parse_status("in_progress").unwrap(), HelpStatus::InProgress);
        assert!(parse_status("resolved").is_err());
    }
}
