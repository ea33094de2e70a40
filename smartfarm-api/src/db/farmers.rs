//! Farmer profile queries
//!
//! Profiles are keyed by the owning user's guid. A blank profile is
//! auto-created when a user registers with the farmer role.

use crate::db::now_iso;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::FarmerProfile;
use sqlx::SqlitePool;

/// Fields a profile update may touch. `None` leaves the column unchanged.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub region: Option<String>,
    pub district: Option<String>,
    pub ward: Option<Option<String>>,
    pub village: Option<Option<String>>,
    pub phone: Option<String>,
    pub farm_size_ha: Option<f64>,
    pub crops_grown: Option<Vec<String>>,
    pub is_lead_farmer: Option<bool>,
    pub lead_farmer_guid: Option<Option<String>>,
}

/// Create an empty profile for a newly registered farmer
pub async fn create_default_profile(db: &SqlitePool, user_guid: &str) -> Result<FarmerProfile> {
    let now = now_iso();

    sqlx::query(
        r#"
        INSERT INTO farmer_profiles (user_guid, created_at, updated_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_guid)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    get_profile(db, user_guid).await
}

pub async fn get_profile(db: &SqlitePool, user_guid: &str) -> Result<FarmerProfile> {
    sqlx::query_as::<_, FarmerProfile>("SELECT * FROM farmer_profiles WHERE user_guid = ?")
        .bind(user_guid)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Farmer profile {} not found", user_guid)))
}

pub async fn list_profiles(
    db: &SqlitePool,
    region: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<FarmerProfile>> {
    let rows = match region {
        Some(region) => {
            sqlx::query_as::<_, FarmerProfile>(
                "SELECT * FROM farmer_profiles WHERE LOWER(region) = LOWER(?)
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(region)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, FarmerProfile>(
                "SELECT * FROM farmer_profiles ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

/// Apply partial changes to a profile
pub async fn update_profile(
    db: &SqlitePool,
    user_guid: &str,
    changes: &ProfileChanges,
) -> Result<FarmerProfile> {
    let current = get_profile(db, user_guid).await?;

    // A dangling lead farmer reference is a caller mistake, not a 500
    if let Some(Some(lead_guid)) = &changes.lead_farmer_guid {
        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM farmer_profiles WHERE user_guid = ?")
                .bind(lead_guid)
                .fetch_optional(db)
                .await?;
        if exists.is_none() {
            return Err(ApiError::field_error(
                "lead_farmer_guid",
                "No farmer profile with that guid.",
            ));
        }
    }

    let crops_grown = match &changes.crops_grown {
        Some(list) => serde_json::to_string(list)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        None => current.crops_grown.clone(),
    };

    sqlx::query(
        r#"
        UPDATE farmer_profiles
        SET region = ?, district = ?, ward = ?, village = ?, phone = ?,
            farm_size_ha = ?, crops_grown = ?, is_lead_farmer = ?,
            lead_farmer_guid = ?, updated_at = ?
        WHERE user_guid = ?
        "#,
    )
    .bind(changes.region.as_ref().unwrap_or(&current.region))
    .bind(changes.district.as_ref().unwrap_or(&current.district))
    .bind(changes.ward.clone().unwrap_or(current.ward))
    .bind(changes.village.clone().unwrap_or(current.village))
    .bind(changes.phone.as_ref().unwrap_or(&current.phone))
    .bind(changes.farm_size_ha.unwrap_or(current.farm_size_ha))
    .bind(&crops_grown)
    .bind(changes.is_lead_farmer.unwrap_or(current.is_lead_farmer))
    .bind(changes.lead_farmer_guid.clone().unwrap_or(current.lead_farmer_guid))
    .bind(now_iso())
    .bind(user_guid)
    .execute(db)
    .await?;

    get_profile(db, user_guid).await
}

/// Mark a profile verified (staff only, enforced by the handler)
pub async fn set_verified(db: &SqlitePool, user_guid: &str, verified: bool) -> Result<FarmerProfile> {
    let verified_at = if verified { Some(now_iso()) } else { None };

    let result = sqlx::query(
        "UPDATE farmer_profiles SET is_verified = ?, verified_at = ?, updated_at = ?
         WHERE user_guid = ?",
    )
    .bind(verified)
    .bind(verified_at)
    .bind(now_iso())
    .bind(user_guid)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Farmer profile {} not found", user_guid)));
    }
    get_profile(db, user_guid).await
}

pub async fn delete_profile(db: &SqlitePool, user_guid: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM farmer_profiles WHERE user_guid = ?")
        .bind(user_guid)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Farmer profile {} not found", user_guid)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use smartfarm_common::db::init_memory_database;

    async fn setup() -> (SqlitePool, String) {
        let db = init_memory_database().await.unwrap();
        let user = create_user(&db, "amina", "amina@example.com", "hash", None, "farmer")
            .await
            .unwrap();
        (db, user.guid)
    }

    #[tokio::test]
    async fn test_default_profile_then_update() {
        let (db, guid) = setup().await;

        let profile = create_default_profile(&db, &guid).await.unwrap();
        assert_eq!(profile.region, "");
        assert_eq!(profile.crops_grown, "[]");
        assert!(!profile.is_verified);

        let changes = ProfileChanges {
            region: Some("Arusha".to_string()),
            district: Some("Meru".to_string()),
            farm_size_ha: Some(5.5),
            crops_grown: Some(vec!["Maize".to_string(), "Beans".to_string()]),
            is_lead_farmer: Some(true),
            ..Default::default()
        };
        let updated = update_profile(&db, &guid, &changes).await.unwrap();
        assert_eq!(updated.region, "Arusha");
        assert_eq!(updated.farm_size_ha, 5.5);
        assert!(updated.is_lead_farmer);
        let crops: Vec<String> = serde_json::from_str(&updated.crops_grown).unwrap();
        assert_eq!(crops, vec!["Maize", "Beans"]);
    }

    #[tokio::test]
    async fn test_verification_stamps_timestamp() {
        let (db, guid) = setup().await;
        create_default_profile(&db, &guid).await.unwrap();

        let verified = set_verified(&db, &guid, true).await.unwrap();
        assert!(verified.is_verified);
        assert!(verified.verified_at.is_some());

        let unverified = set_verified(&db, &guid, false).await.unwrap();
        assert!(!unverified.is_verified);
        assert!(unverified.verified_at.is_none());
    }

    #[tokio::test]
    async fn test_dangling_lead_farmer_is_field_error() {
        let (db, guid) = setup().await;
        create_default_profile(&db, &guid).await.unwrap();

        let err = update_profile(
            &db,
            &guid,
            &ProfileChanges {
                lead_farmer_guid: Some(Some("no-such-profile".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        match err {
            ApiError::Validation { details, .. } => {
                assert!(details["lead_farmer_guid"][0].is_string());
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        // A real profile is accepted
        let lead = create_user(&db, "lead", "lead@example.com", "hash", None, "farmer")
            .await
            .unwrap();
        create_default_profile(&db, &lead.guid).await.unwrap();
        let updated = update_profile(
            &db,
            &guid,
            &ProfileChanges {
                lead_farmer_guid: Some(Some(lead.guid.clone())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.lead_farmer_guid.as_deref(), Some(lead.guid.as_str()));
    }

    #[tokio::test]
    async fn test_profile_cascades_with_user() {
        let (db, guid) = setup().await;
        create_default_profile(&db, &guid).await.unwrap();

        sqlx::query("DELETE FROM users WHERE guid = ?")
            .bind(&guid)
            .execute(&db)
            .await
            .unwrap();

        assert!(matches!(
            get_profile(&db, &guid).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_region_filter() {
        let (db, guid) = setup().await;
        create_default_profile(&db, &guid).await.unwrap();
        update_profile(
            &db,
            &guid,
            &ProfileChanges {
                region: Some("Nakuru".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let hits = list_profiles(&db, Some("nakuru"), 50, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        let misses = list_profiles(&db, Some("Nairobi"), 50, 0).await.unwrap();
        assert!(misses.is_empty());
    }
}
