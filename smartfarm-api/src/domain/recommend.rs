//! Crop recommendation scoring
//!
//! Weighted-sum heuristic over region/season/soil/maturity. Scores are
//! only comparable within a single query; they carry no absolute meaning.

/// Scoring inputs for one candidate crop
#[derive(Debug, Clone)]
pub struct CandidateCrop<'a> {
    pub season: &'a str,
    pub soil_type: &'a str,
    pub regions: &'a [String],
    pub maturity_days: i64,
}

/// Maturity sweet spot in days; closeness to this adds up to +1.0
const MATURITY_TARGET_DAYS: f64 = 120.0;

/// Score a candidate crop against the query filters.
///
/// Components:
/// - region match: +1.0 (case-insensitive membership in the regions list)
/// - season match: +1.0 when a season filter is given and equal
/// - soil filter given: +1.0 on match, -0.1 otherwise
/// - maturity closeness: linear decay from +1.0 at 120 days to 0 at 240,
///   with an extra -0.05 for crops slower than the target
pub fn score_crop(
    crop: &CandidateCrop<'_>,
    region: &str,
    season: Option<&str>,
    soil_type: Option<&str>,
) -> f64 {
    let mut score = 0.0;

    let region_match = crop
        .regions
        .iter()
        .any(|r| r.eq_ignore_ascii_case(region));
    if region_match {
        score += 1.0;
    }

    if let Some(season) = season {
        if crop.season == season {
            score += 1.0;
        }
    }

    if let Some(soil) = soil_type {
        if !crop.soil_type.is_empty() && crop.soil_type.eq_ignore_ascii_case(soil) {
            score += 1.0;
        } else {
            // Small penalty when a soil filter is provided but doesn't match
            score -= 0.1;
        }
    }

    if crop.maturity_days > 0 {
        let diff = (crop.maturity_days as f64 - MATURITY_TARGET_DAYS).abs();
        // linear decay: 0 diff -> 1.0, 120+ diff -> 0
        score += (1.0 - diff / MATURITY_TARGET_DAYS).max(0.0);
        // Differentiate extreme values on the slow side
        if crop.maturity_days as f64 > MATURITY_TARGET_DAYS {
            score -= 0.05;
        }
    }

    score
}

/// Convert a numeric score to a human-readable suitability level
pub fn suitability_level(score: f64) -> &'static str {
    if score >= 2.5 {
        "excellent"
    } else if score >= 2.0 {
        "very_good"
    } else if score >= 1.5 {
        "good"
    } else if score >= 1.0 {
        "fair"
    } else {
        "poor"
    }
}

/// Round a score for presentation (4 decimal places)
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
