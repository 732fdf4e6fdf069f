use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use domains::{HelpMessage, Issue, IssueStatus, Result, SupportRepo};

use super::{db_err, parse_opt_uuid, parse_uuid, SqliteStore};

fn map_issue(row: &sqlx::sqlite::SqliteRow) -> Result<Issue> {
    Ok(Issue {
        id: parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?,
        name: row.try_get("name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        status: IssueStatus::parse(&row.try_get::<String, _>("status").map_err(db_err)?)?,
        user_id: parse_opt_uuid(row.try_get("user_id").map_err(db_err)?)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
    })
}

fn map_help_message(row: &sqlx::sqlite::SqliteRow) -> Result<HelpMessage> {
    Ok(HelpMessage {
        id: parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?,
        user_id: parse_uuid(&row.try_get::<String, _>("user_id").map_err(db_err)?)?,
        user_email: row.try_get("user_email").map_err(db_err)?,
        message: row.try_get("message").map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
    })
}

#[async_trait]
impl SupportRepo for SqliteStore {
    async fn insert_issue(&self, issue: &Issue) -> Result<()> {
        sqlx::query(
            "INSERT INTO issues (id, name, email, description, status, user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(issue.id.to_string())
        .bind(&issue.name)
        .bind(&issue.email)
        .bind(&issue.description)
        .bind(issue.status.as_str())
        .bind(issue.user_id.map(|id| id.to_string()))
        .bind(issue.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_issue(&self, id: Uuid) -> Result<Option<Issue>> {
        let row = sqlx::query("SELECT * FROM issues WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_issue).transpose()
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let rows = sqlx::query("SELECT * FROM issues ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_issue).collect()
    }

    async fn set_issue_status(&self, id: Uuid, status: IssueStatus) -> Result<()> {
        sqlx::query("UPDATE issues SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_help_message(&self, message: &HelpMessage) -> Result<()> {
        sqlx::query(
            "INSERT INTO help_messages (id, user_id, user_email, message, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.user_id.to_string())
        .bind(&message.user_email)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_help_messages(&self) -> Result<Vec<HelpMessage>> {
        let rows = sqlx::query("SELECT * FROM help_messages ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_help_message).collect()
    }
}
