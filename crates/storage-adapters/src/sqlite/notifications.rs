use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use domains::{Notification, NotificationKind, NotificationRepo, Result};

use super::{db_err, parse_uuid, SqliteStore};

fn map_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification> {
    Ok(Notification {
        id: parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?,
        user_id: parse_uuid(&row.try_get::<String, _>("user_id").map_err(db_err)?)?,
        title: row.try_get("title").map_err(db_err)?,
        message: row.try_get("message").map_err(db_err)?,
        link: row.try_get("link").map_err(db_err)?,
        is_read: row.try_get("is_read").map_err(db_err)?,
        kind: NotificationKind::parse(&row.try_get::<String, _>("kind").map_err(db_err)?)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
    })
}

fn insert_query(n: &Notification) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        "INSERT INTO notifications (id, user_id, title, message, link, is_read, kind, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(n.id.to_string())
    .bind(n.user_id.to_string())
    .bind(&n.title)
    .bind(&n.message)
    .bind(&n.link)
    .bind(n.is_read)
    .bind(n.kind.as_str())
    .bind(n.created_at)
}

#[async_trait]
impl NotificationRepo for SqliteStore {
    async fn insert(&self, notification: &Notification) -> Result<()> {
        insert_query(notification)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// All rows inside one transaction: a failure rolls back to zero.
    async fn insert_batch(&self, batch: &[Notification]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for notification in batch {
            insert_query(notification)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_notification).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_notification).collect()
    }

    async fn set_read(&self, id: Uuid, is_read: bool) -> Result<()> {
        sqlx::query("UPDATE notifications SET is_read = ? WHERE id = ?")
            .bind(is_read)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS unread FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        let count: i64 = row.try_get("unread").map_err(db_err)?;
        Ok(count as u64)
    }
}
