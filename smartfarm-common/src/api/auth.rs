//! API authentication via JWT bearer tokens
//!
//! # Architecture
//!
//! - Passwords are hashed with bcrypt and never stored in clear.
//! - Access tokens are HS256 JWTs with a 24 hour expiry.
//! - The signing secret lives in the database settings table under
//!   `jwt_secret` and is generated on first run.
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions and database operations.
//! No HTTP framework dependencies (Axum, etc.) - those live in the
//! service crate's middleware.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Access token lifetime in seconds (24 hours)
const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone)]
pub enum ApiAuthError {
    /// Token could not be decoded or failed validation
    InvalidToken(String),

    /// Token expired
    Expired,

    /// Password does not match the stored hash
    InvalidCredentials,

    /// bcrypt hashing failure
    HashError(String),

    /// Database error loading the signing secret
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::InvalidToken(reason) => write!(f, "Invalid token: {}", reason),
            ApiAuthError::Expired => write!(f, "Token expired"),
            ApiAuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiAuthError::HashError(err) => write!(f, "Hash error: {}", err),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Token Claims
// ========================================

/// JWT claims carried by every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user guid
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Expiry as Unix epoch seconds
    pub exp: u64,
}

impl Claims {
    pub fn user_guid(&self) -> Result<Uuid, ApiAuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| ApiAuthError::InvalidToken(format!("Bad subject: {}", e)))
    }

    /// Staff roles may see all tickets and verify profiles
    pub fn is_staff(&self) -> bool {
        matches!(self.role.as_str(), "agronomist" | "extension_officer" | "admin")
    }
}

// ========================================
// Signing Secret Management
// ========================================

/// Load the JWT signing secret from database settings
///
/// Key: `jwt_secret`. Generated and stored on first access so a fresh
/// database works without manual provisioning.
pub async fn load_jwt_secret(db: &SqlitePool) -> Result<String, ApiAuthError> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = 'jwt_secret'")
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => Ok(value),
        None => initialize_jwt_secret(db).await,
    }
}

/// Generate and persist a random signing secret
async fn initialize_jwt_secret(db: &SqlitePool) -> Result<String, ApiAuthError> {
    use rand::Rng;

    let secret: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('jwt_secret', ?)")
        .bind(&secret)
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Password Hashing
// ========================================

/// Hash a password with bcrypt at the default cost
pub fn hash_password(password: &str) -> Result<String, ApiAuthError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| ApiAuthError::HashError(e.to_string()))
}

/// Verify a password against a stored bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<(), ApiAuthError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiAuthError::InvalidCredentials),
        Err(e) => Err(ApiAuthError::HashError(e.to_string())),
    }
}

// ========================================
// Token Issue and Validation
// ========================================

/// Issue an access token for a user
pub fn issue_token(
    secret: &str,
    user_guid: Uuid,
    username: &str,
    role: &str,
) -> Result<String, ApiAuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_secs();

    let claims = Claims {
        sub: user_guid.to_string(),
        username: username.to_string(),
        role: role.to_string(),
        exp: now + TOKEN_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiAuthError::InvalidToken(e.to_string()))
}

/// Validate a bearer token and return its claims
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, ApiAuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiAuthError::Expired,
        _ => ApiAuthError::InvalidToken(e.to_string()),
    })
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2-but-longer").unwrap();
        assert_ne!(hash, "hunter2-but-longer");
        assert!(verify_password("hunter2-but-longer", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(ApiAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_token_roundtrip() {
        let guid = Uuid::new_v4();
        let token = issue_token("test-secret", guid, "amina", "farmer").unwrap();

        let claims = validate_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, guid.to_string());
        assert_eq!(claims.username, "amina");
        assert_eq!(claims.role, "farmer");
        assert_eq!(claims.user_guid().unwrap(), guid);
        assert!(!claims.is_staff());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token("secret-a", Uuid::new_v4(), "amina", "farmer").unwrap();
        assert!(validate_token("secret-b", &token).is_err());
    }

    #[test]
    fn test_staff_roles() {
        for role in ["agronomist", "extension_officer", "admin"] {
            let claims = Claims {
                sub: Uuid::new_v4().to_string(),
                username: "staff".to_string(),
                role: role.to_string(),
                exp: u64::MAX,
            };
            assert!(claims.is_staff(), "{} should be staff", role);
        }

        let farmer = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "farmer".to_string(),
            role: "farmer".to_string(),
            exp: u64::MAX,
        };
        assert!(!farmer.is_staff());
    }

    #[tokio::test]
    async fn test_jwt_secret_initialized_once() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();

        let first = load_jwt_secret(&pool).await.unwrap();
        let second = load_jwt_secret(&pool).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 48);
    }
}
