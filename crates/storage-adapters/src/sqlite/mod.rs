//! # SQLite store
//!
//! Implements every persistence port against one SQLite pool. This module
//! owns the pool, schema, and the row/model mapping helpers; the per-port
//! `impl` blocks live in the sibling modules.
//!
//! Mapping notes: UUIDs are TEXT, timestamps are chrono-encoded TEXT, the
//! photos list and profile map are JSON columns. Unread flags are
//! per-participant *rows* (`conversation_unread`), not a map column, so the
//! sender's and the reader's concurrent writes touch different rows.

mod ads;
mod conversations;
mod notifications;
mod site;
mod support;
mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use domains::{AppError, Result};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        name          TEXT NOT NULL,
        role          TEXT NOT NULL,
        disabled      INTEGER NOT NULL DEFAULT 0,
        mobile_number TEXT,
        photo_url     TEXT,
        created_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS ads (
        id               TEXT PRIMARY KEY,
        title            TEXT NOT NULL,
        description      TEXT NOT NULL,
        category         TEXT NOT NULL,
        subcategory      TEXT,
        price            INTEGER NOT NULL,
        location         TEXT NOT NULL,
        taluka           TEXT,
        photos           TEXT NOT NULL,
        mobile_number    TEXT,
        user_id          TEXT NOT NULL REFERENCES users(id),
        status           TEXT NOT NULL,
        rejection_reason TEXT,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_ads_status ON ads(status, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_ads_owner ON ads(user_id)",
    "CREATE TABLE IF NOT EXISTS conversations (
        id                     TEXT PRIMARY KEY,
        ad_id                  TEXT NOT NULL,
        ad_title               TEXT NOT NULL,
        ad_photo               TEXT,
        participant_lo         TEXT NOT NULL,
        participant_hi         TEXT NOT NULL,
        profiles               TEXT NOT NULL,
        last_message           TEXT,
        last_message_sender_id TEXT,
        last_message_at        TEXT,
        created_at             TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_conversations_lo ON conversations(participant_lo)",
    "CREATE INDEX IF NOT EXISTS idx_conversations_hi ON conversations(participant_hi)",
    "CREATE TABLE IF NOT EXISTS conversation_unread (
        conversation_id TEXT NOT NULL REFERENCES conversations(id),
        user_id         TEXT NOT NULL,
        unread          INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (conversation_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id              TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL REFERENCES conversations(id),
        text            TEXT NOT NULL,
        sender_id       TEXT NOT NULL,
        sent_at         TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_log ON messages(conversation_id, sent_at)",
    "CREATE TABLE IF NOT EXISTS notifications (
        id         TEXT PRIMARY KEY,
        user_id    TEXT NOT NULL,
        title      TEXT NOT NULL,
        message    TEXT NOT NULL,
        link       TEXT,
        is_read    INTEGER NOT NULL DEFAULT 0,
        kind       TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at)",
    "CREATE TABLE IF NOT EXISTS issues (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL,
        description TEXT NOT NULL,
        status      TEXT NOT NULL,
        user_id     TEXT,
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS help_messages (
        id         TEXT PRIMARY KEY,
        user_id    TEXT NOT NULL,
        user_email TEXT NOT NULL,
        message    TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS site_config (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

/// One pool, all ports. Cheap to clone.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (and create if missing) the database at `url`, e.g.
    /// `sqlite:gram_bazaar.db`, and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(db_err)?;
        let store = SqliteStore { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Private in-memory database, used by tests and the seed tool's
    /// dry-run mode. Capped at one connection: each SQLite `:memory:`
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err)?;
        let store = SqliteStore { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }
}

pub(crate) fn db_err(err: impl std::fmt::Display) -> AppError {
    AppError::internal(err)
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|err| AppError::internal(format!("corrupt uuid {raw:?}: {err}")))
}

pub(crate) fn parse_opt_uuid(raw: Option<String>) -> Result<Option<Uuid>> {
    raw.as_deref().map(parse_uuid).transpose()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use domains::{Role, User, UserRepo};

    use super::SqliteStore;

    pub(crate) async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    pub(crate) async fn seed_user(store: &SqliteStore, name: &str) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{name}@example.in"),
            name: name.to_string(),
            role: Role::Farmer,
            disabled: false,
            mobile_number: None,
            photo_url: None,
            created_at: Utc::now(),
        };
        UserRepo::insert(store, &user).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let store = store().await;
        store.init_schema().await.unwrap();
        store.init_schema().await.unwrap();
    }
}
