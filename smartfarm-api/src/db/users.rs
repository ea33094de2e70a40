//! User account queries

use crate::db::now_iso;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::User;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert a new user row. Duplicate username or email maps to Conflict.
pub async fn create_user(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
    role: &str,
) -> Result<User> {
    let guid = Uuid::new_v4().to_string();
    let now = now_iso();

    let result = sqlx::query(
        r#"
        INSERT INTO users (guid, username, email, password_hash, phone, role,
                           is_active, is_verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, 0, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(phone)
    .bind(role)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await;

    match result {
        Ok(_) => get_user_by_guid(db, &guid).await,
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(
            "A user with that username or email already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_user_by_guid(db: &SqlitePool, guid: &str) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", guid)))
}

/// Lookup by username, falling back to email (login accepts either)
pub async fn get_user_by_login(db: &SqlitePool, login: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ?")
        .bind(login)
        .bind(login)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_common::db::init_memory_database;

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let db = init_memory_database().await.unwrap();

        let user = create_user(&db, "amina", "amina@example.com", "hash", None, "farmer")
            .await
            .unwrap();
        assert_eq!(user.username, "amina");
        assert_eq!(user.role, "farmer");
        assert!(user.is_active);
        assert!(!user.is_verified);

        let by_name = get_user_by_login(&db, "amina").await.unwrap().unwrap();
        assert_eq!(by_name.guid, user.guid);

        let by_email = get_user_by_login(&db, "amina@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.guid, user.guid);

        assert!(get_user_by_login(&db, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = init_memory_database().await.unwrap();

        create_user(&db, "amina", "a@example.com", "hash", None, "farmer")
            .await
            .unwrap();
        let err = create_user(&db, "amina", "b@example.com", "hash", None, "farmer")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let db = init_memory_database().await.unwrap();

        create_user(&db, "amina", "a@example.com", "hash", None, "farmer")
            .await
            .unwrap();
        let err = create_user(&db, "betty", "a@example.com", "hash", None, "farmer")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
