//! Help request (support ticket) queries
//!
//! Role rules are enforced by the handlers; this module only scopes the
//! listing query to the owner when asked.

use crate::db::now_iso;
use crate::error::{ApiError, Result};
use smartfarm_common::db::models::{HelpRequest, HelpStatus};
use sqlx::SqlitePool;
use uuid::Uuid;

pub async fn create_request(db: &SqlitePool, user_guid: &str, message: &str) -> Result<HelpRequest> {
    let guid = Uuid::new_v4().to_string();
    let now = now_iso();

    sqlx::query(
        r#"
        INSERT INTO help_requests (guid, user_guid, message, status, created_at, updated_at)
        VALUES (?, ?, ?, 'open', ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(user_guid)
    .bind(message)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    get_request(db, &guid).await
}

pub async fn get_request(db: &SqlitePool, guid: &str) -> Result<HelpRequest> {
    sqlx::query_as::<_, HelpRequest>("SELECT * FROM help_requests WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Help request {} not found", guid)))
}

/// List newest-first; `owner_guid` scopes the result to one user's tickets
pub async fn list_requests(
    db: &SqlitePool,
    owner_guid: Option<&str>,
    status: Option<HelpStatus>,
) -> Result<Vec<HelpRequest>> {
    let mut sql = String::from("SELECT * FROM help_requests WHERE 1 = 1");
    if owner_guid.is_some() {
        sql.push_str(" AND user_guid = ?");
    }
    if status.is_some() {
        sql.push_str(" AND status = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, HelpRequest>(&sql);
    if let Some(owner) = owner_guid {
        query = query.bind(owner.to_string());
    }
    if let Some(status) = status {
        query = query.bind(status.as_str());
    }

    Ok(query.fetch_all(db).await?)
}

pub async fn update_request(
    db: &SqlitePool,
    guid: &str,
    message: Option<&str>,
    status: Option<HelpStatus>,
) -> Result<HelpRequest> {
    let current = get_request(db, guid).await?;

    sqlx::query("UPDATE help_requests SET message = ?, status = ?, updated_at = ? WHERE guid = ?")
        .bind(message.unwrap_or(&current.message))
        .bind(status.map(|s| s.as_str()).unwrap_or(&current.status))
        .bind(now_iso())
        .bind(guid)
        .execute(db)
        .await?;

    get_request(db, guid).await
}

pub async fn delete_request(db: &SqlitePool, guid: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM help_requests WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("Help request {} not found", guid)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use smartfarm_common::db::init_memory_database;

    #[tokio::test]
    async fn test_lifecycle() {
        let db = init_memory_database().await.unwrap();
        let user = create_user(&db, "amina", "amina@example.com", "hash", None, "farmer")
            .await
            .unwrap();

        let ticket = create_request(&db, &user.guid, "My maize leaves are yellowing")
            .await
            .unwrap();
        assert_eq!(ticket.status, "open");

        let updated = update_request(&db, &ticket.guid, None, Some(HelpStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(updated.status, "in_progress");
        assert_eq!(updated.message, "My maize leaves are yellowing");

        delete_request(&db, &ticket.guid).await.unwrap();
        assert!(matches!(
            get_request(&db, &ticket.guid).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let db = init_memory_database().await.unwrap();
        let amina = create_user(&db, "amina", "amina@example.com", "hash", None, "farmer")
            .await
            .unwrap();
        let betty = create_user(&db, "betty", "betty@example.com", "hash", None, "farmer")
            .await
            .unwrap();

        create_request(&db, &amina.guid, "ticket A").await.unwrap();
        create_request(&db, &betty.guid, "ticket B").await.unwrap();

        let all = list_requests(&db, None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let aminas = list_requests(&db, Some(&amina.guid), None).await.unwrap();
        assert_eq!(aminas.len(), 1);
        assert_eq!(aminas[0].message, "ticket A");
    }

    #[tokio::test]
    async fn test_status_filter() {
        let db = init_memory_database().await.unwrap();
        let user = create_user(&db, "amina", "amina@example.com", "hash", None, "farmer")
            .await
            .unwrap();

        let open = create_request(&db, &user.guid, "open one").await.unwrap();
        let closed = create_request(&db, &user.guid, "closed one").await.unwrap();
        update_request(&db, &closed.guid, None, Some(HelpStatus::Closed))
            .await
            .unwrap();

        let only_open = list_requests(&db, None, Some(HelpStatus::Open)).await.unwrap();
        assert_eq!(only_open.len(), 1);
        assert_eq!(only_open[0].guid, open.guid);
    }
}
