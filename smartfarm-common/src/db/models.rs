//! Database models

use serde::{Deserialize, Serialize};

/// Growing season choice shared by crops and yield forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Major,
    Minor,
    All,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Major => "major",
            Season::Minor => "minor",
            Season::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "major" => Some(Season::Major),
            "minor" => Some(Season::Minor),
            "all" => Some(Season::All),
            _ => None,
        }
    }
}

/// User role choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Agronomist,
    Supplier,
    ExtensionOfficer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Agronomist => "agronomist",
            Role::Supplier => "supplier",
            Role::ExtensionOfficer => "extension_officer",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "farmer" => Some(Role::Farmer),
            "agronomist" => Some(Role::Agronomist),
            "supplier" => Some(Role::Supplier),
            "extension_officer" => Some(Role::ExtensionOfficer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Help request status choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpStatus {
    Open,
    InProgress,
    Closed,
}

impl HelpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpStatus::Open => "open",
            HelpStatus::InProgress => "in_progress",
            HelpStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(HelpStatus::Open),
            "in_progress" => Some(HelpStatus::InProgress),
            "closed" => Some(HelpStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FarmerProfile {
    pub user_guid: String,
    pub region: String,
    pub district: String,
    pub ward: Option<String>,
    pub village: Option<String>,
    pub phone: String,
    pub farm_size_ha: f64,
    /// JSON array of crop names
    pub crops_grown: String,
    pub is_lead_farmer: bool,
    pub lead_farmer_guid: Option<String>,
    pub is_verified: bool,
    pub verified_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Crop {
    pub guid: String,
    pub name: String,
    pub season: String,
    pub soil_type: String,
    /// JSON array of region names
    pub regions: String,
    /// JSON object of recommended inputs
    pub recommended_inputs: String,
    pub maturity_days: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketPrice {
    pub guid: String,
    pub crop_guid: String,
    pub region: String,
    pub price: f64,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Supplier {
    pub guid: String,
    pub owner_guid: Option<String>,
    pub name: String,
    /// JSON array of {"name", "unit", "price"?} objects
    pub product_list: String,
    pub location: String,
    pub phone: String,
    pub is_verified: bool,
    pub verified_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HelpRequest {
    pub guid: String,
    pub user_guid: String,
    pub message: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct YieldForecast {
    pub guid: String,
    pub crop_guid: Option<String>,
    pub crop_name: String,
    pub region: String,
    pub season: String,
    pub hectares: f64,
    pub forecast_yield: f64,
    /// JSON snapshot of the coefficients used
    pub factors: String,
    pub method: String,
    pub created_at: String,
}
