//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently on every start. Missing files or directories are created
//! rather than treated as fatal.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database (tests)
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    configure_connection(&pool).await?;
    create_schema(&pool).await?;
    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Run all schema creation (idempotent - safe to call multiple times)
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_farmer_profiles_table(pool).await?;
    create_crops_table(pool).await?;
    create_market_prices_table(pool).await?;
    create_suppliers_table(pool).await?;
    create_help_requests_table(pool).await?;
    create_yield_forecasts_table(pool).await?;
    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            phone TEXT,
            role TEXT NOT NULL DEFAULT 'farmer',
            is_active INTEGER NOT NULL DEFAULT 1,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_farmer_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS farmer_profiles (
            user_guid TEXT PRIMARY KEY REFERENCES users(guid) ON DELETE CASCADE,
            region TEXT NOT NULL DEFAULT '',
            district TEXT NOT NULL DEFAULT '',
            ward TEXT,
            village TEXT,
            phone TEXT NOT NULL DEFAULT '',
            farm_size_ha REAL NOT NULL DEFAULT 0.0,
            crops_grown TEXT NOT NULL DEFAULT '[]',
            is_lead_farmer INTEGER NOT NULL DEFAULT 0,
            lead_farmer_guid TEXT REFERENCES farmer_profiles(user_guid) ON DELETE SET NULL,
            is_verified INTEGER NOT NULL DEFAULT 0,
            verified_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_crops_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS crops (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            season TEXT NOT NULL DEFAULT 'major',
            soil_type TEXT NOT NULL DEFAULT '',
            regions TEXT NOT NULL DEFAULT '[]',
            recommended_inputs TEXT NOT NULL DEFAULT '{}',
            maturity_days INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_market_prices_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_prices (
            guid TEXT PRIMARY KEY,
            crop_guid TEXT NOT NULL REFERENCES crops(guid) ON DELETE CASCADE,
            region TEXT NOT NULL,
            price REAL NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_market_prices_crop_region
         ON market_prices(crop_guid, region)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_market_prices_date ON market_prices(date)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_suppliers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            guid TEXT PRIMARY KEY,
            owner_guid TEXT REFERENCES users(guid) ON DELETE SET NULL,
            name TEXT NOT NULL,
            product_list TEXT NOT NULL DEFAULT '[]',
            location TEXT NOT NULL,
            phone TEXT NOT NULL,
            is_verified INTEGER NOT NULL DEFAULT 0,
            verified_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_suppliers_name ON suppliers(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_suppliers_location ON suppliers(location)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_help_requests_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS help_requests (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'open',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_help_requests_status ON help_requests(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_help_requests_user ON help_requests(user_guid)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_yield_forecasts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS yield_forecasts (
            guid TEXT PRIMARY KEY,
            crop_guid TEXT REFERENCES crops(guid) ON DELETE SET NULL,
            crop_name TEXT NOT NULL,
            region TEXT NOT NULL,
            season TEXT NOT NULL,
            hectares REAL NOT NULL,
            forecast_yield REAL NOT NULL,
            factors TEXT NOT NULL DEFAULT '{}',
            method TEXT NOT NULL DEFAULT 'mock_v1',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_yield_forecasts_region ON yield_forecasts(region)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_yield_forecasts_season ON yield_forecasts(season)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_yield_forecasts_crop_name ON yield_forecasts(crop_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
