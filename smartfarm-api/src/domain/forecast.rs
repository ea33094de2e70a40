//! Deterministic yield forecast
//!
//! `forecast = base_yield(crop) * region_multiplier(region)
//!            * season_factor(season) * hectares`, rounded to 2 decimals.
//!
//! Coefficients are a fixed in-code table keyed by lowercase crop and
//! region names. Method tag `mock_v1` marks rows produced by this
//! formula so a future model can coexist with the historical data.

use serde::{Deserialize, Serialize};
use smartfarm_common::db::models::Season;

/// Method tag stored with every persisted forecast
pub const METHOD_MOCK_V1: &str = "mock_v1";

/// Coefficient snapshot persisted alongside each forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFactors {
    pub base_yield_t_per_ha: f64,
    pub regional_multiplier: f64,
    pub season_factor: f64,
}

/// Base yield in tonnes per hectare, keyed by lowercase crop name
pub fn base_yield(crop_name: &str) -> Option<f64> {
    match crop_name.to_lowercase().as_str() {
        "maize" => Some(4.0),
        "wheat" => Some(3.5),
        "beans" => Some(1.6),
        "rice" => Some(5.0),
        "coffee" => Some(1.2),
        "tea" => Some(2.2),
        _ => None,
    }
}

/// Regional productivity multiplier, keyed by lowercase region name
pub fn region_multiplier(region: &str) -> Option<f64> {
    match region.to_lowercase().as_str() {
        "nairobi" => Some(0.9),
        "kisumu" => Some(1.0),
        "nakuru" => Some(1.1),
        "mombasa" => Some(0.85),
        "eldoret" => Some(1.15),
        _ => None,
    }
}

/// Seasonal factor
pub fn season_factor(season: Season) -> f64 {
    match season {
        Season::Major => 1.0,
        Season::Minor => 0.8,
        Season::All => 0.95,
    }
}

/// Round to 2 decimal places (half away from zero)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the forecast yield in tonnes
pub fn compute_forecast(factors: &ForecastFactors, hectares: f64) -> f64 {
    round2(
        factors.base_yield_t_per_ha * factors.regional_multiplier * factors.season_factor * hectares,
    )
}

/// Look up the full coefficient set for a crop/region/season combination.
/// Returns None when the crop or region has no table entry.
pub fn lookup_factors(crop_name: &str, region: &str, season: Season) -> Option<ForecastFactors> {
    Some(ForecastFactors {
        base_yield_t_per_ha: base_yield(crop_name)?,
        regional_multiplier: region_multiplier(region)?,
        season_factor: season_factor(season),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maize_nairobi_major_regression() {
        // 4.0 * 0.9 * 1.0 * 2.5 = 9.00
        let factors = lookup_factors("Maize", "Nairobi", Season::Major).unwrap();
        assert_eq!(factors.base_yield_t_per_ha, 4.0);
        assert_eq!(factors.regional_multiplier, 0.9);
        assert_eq!(factors.season_factor, 1.0);
        assert_eq!(compute_forecast(&factors, 2.5), 9.00);
    }

    #[test]
    fn test_wheat_nakuru_all_regression() {
        // 3.5 * 1.1 * 0.95 * 1.0 = 3.6575 -> 3.66
        let factors = lookup_factors("Wheat", "Nakuru", Season::All).unwrap();
        assert_eq!(compute_forecast(&factors, 1.0), 3.66);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(lookup_factors("MAIZE", "NAIROBI", Season::Major).is_some());
        assert!(lookup_factors("maize", "nairobi", Season::Major).is_some());
    }

    #[test]
    fn test_unknown_crop_or_region_rejected() {
        assert!(lookup_factors("Dragonfruit", "Nairobi", Season::Major).is_none());
        assert!(lookup_factors("Maize", "Atlantis", Season::Major).is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.6575), 3.66);
        assert_eq!(round2(9.0), 9.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
