//! Crop recommendation handler
//!
//! Scores catalogue crops against the caller's region (required) and
//! optional season and soil filters, returning the top five.

use crate::api::AppContext;
use crate::db::crops::{self, CropFilters};
use crate::domain::recommend::{round_score, score_crop, suitability_level, CandidateCrop};
use crate::error::{ApiError, Result};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smartfarm_common::api::ApiEnvelope;
use smartfarm_common::db::models::{Crop, Season};

/// Recommendations always return at most this many crops
const TOP_N: usize = 5;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub region: Option<String>,
    pub season: Option<String>,
    pub soil_type: Option<String>,
}

fn regions_of(crop: &Crop) -> Vec<String> {
    serde_json::from_str(&crop.regions).unwrap_or_default()
}

/// GET /api/v1/recommendations
pub async fn recommend(
    State(ctx): State<AppContext>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<ApiEnvelope<Value>>> {
    let region = match query.region.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => return Err(ApiError::field_error("region", "This field is required.")),
    };
    let season = match query.season.as_deref() {
        Some(value) => Some(
            Season::parse(value)
                .ok_or_else(|| {
                    ApiError::field_error("season", format!("'{}' is not a valid season.", value))
                })?
                .as_str(),
        ),
        None => None,
    };
    let soil_type = query.soil_type.as_deref().map(str::trim).filter(|s| !s.is_empty());

    // The SQL region filter is a containment pre-pass; exact membership
    // is re-checked here against the parsed regions list
    let candidates = crops::list_crops(
        &ctx.db_pool,
        &CropFilters {
            region: Some(region.clone()),
            ..Default::default()
        },
        500,
        0,
    )
    .await?;

    let mut scored: Vec<(f64, &Crop, Vec<String>)> = Vec::new();
    for crop in &candidates {
        let regions = regions_of(crop);
        if !regions.iter().any(|r| r.eq_ignore_ascii_case(&region)) {
            continue;
        }
        let candidate = CandidateCrop {
            season: &crop.season,
            soil_type: &crop.soil_type,
            regions: &regions,
            maturity_days: crop.maturity_days,
        };
        let score = score_crop(&candidate, &region, season, soil_type);
        scored.push((score, crop, regions));
    }

    // `count` reports every crop that was scored; `results` is capped
    let scored_count = scored.len();
    // Stable sort keeps catalogue (name) order among equal scores
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(TOP_N);

    let results: Vec<Value> = scored
        .iter()
        .map(|(score, crop, regions)| {
            let inputs: Value = serde_json::from_str(&crop.recommended_inputs)
                .unwrap_or_else(|_| json!({}));
            json!({
                "guid": crop.guid,
                "name": crop.name,
                "season": crop.season,
                "soil_type": crop.soil_type,
                "regions": regions,
                "recommended_inputs": inputs,
                "maturity_days": crop.maturity_days,
                "score": round_score(*score),
                "suitability": suitability_level(*score),
            })
        })
        .collect();

    Ok(Json(ApiEnvelope::success(
        json!({
            "count": scored_count,
            "total_available": scored_count,
            "results": results,
            "filters_applied": {
                "region": region,
                "season": season,
                "soil_type": soil_type,
            },
        }),
        "Success",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_parse_tolerates_bad_json() {
        let crop = Crop {
            guid: "g".to_string(),
            name: "Maize".to_string(),
            season: "major".to_string(),
            soil_type: "loamy".to_string(),
            regions: "not json".to_string(),
            recommended_inputs: "{}".to_string(),
            maturity_days: 120,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(regions_of(&crop).is_empty());
    }
}
