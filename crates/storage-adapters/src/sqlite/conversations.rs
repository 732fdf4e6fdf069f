use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use domains::{AppError, ChatMessage, Conversation, ConversationRepo, ParticipantProfile, Result};

use super::{db_err, parse_opt_uuid, parse_uuid, SqliteStore};

fn map_conversation(
    row: &sqlx::sqlite::SqliteRow,
    unread: HashMap<Uuid, bool>,
) -> Result<Conversation> {
    let profiles: String = row.try_get("profiles").map_err(db_err)?;
    let profiles: HashMap<Uuid, ParticipantProfile> =
        serde_json::from_str(&profiles).map_err(db_err)?;
    Ok(Conversation {
        id: parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?,
        ad_id: parse_uuid(&row.try_get::<String, _>("ad_id").map_err(db_err)?)?,
        ad_title: row.try_get("ad_title").map_err(db_err)?,
        ad_photo: row.try_get("ad_photo").map_err(db_err)?,
        participants: [
            parse_uuid(&row.try_get::<String, _>("participant_lo").map_err(db_err)?)?,
            parse_uuid(&row.try_get::<String, _>("participant_hi").map_err(db_err)?)?,
        ],
        profiles,
        last_message: row.try_get("last_message").map_err(db_err)?,
        last_message_sender_id: parse_opt_uuid(
            row.try_get("last_message_sender_id").map_err(db_err)?,
        )?,
        last_message_at: row
            .try_get::<Option<DateTime<Utc>>, _>("last_message_at")
            .map_err(db_err)?,
        unread,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
    })
}

fn map_message(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage> {
    Ok(ChatMessage {
        id: parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?,
        conversation_id: parse_uuid(
            &row.try_get::<String, _>("conversation_id").map_err(db_err)?,
        )?,
        text: row.try_get("text").map_err(db_err)?,
        sender_id: parse_uuid(&row.try_get::<String, _>("sender_id").map_err(db_err)?)?,
        sent_at: row.try_get::<DateTime<Utc>, _>("sent_at").map_err(db_err)?,
    })
}

impl SqliteStore {
    async fn unread_rows(&self, conversation_id: Uuid) -> Result<HashMap<Uuid, bool>> {
        let rows = sqlx::query(
            "SELECT user_id, unread FROM conversation_unread WHERE conversation_id = ?",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        let mut unread = HashMap::with_capacity(rows.len());
        for row in rows {
            let user = parse_uuid(&row.try_get::<String, _>("user_id").map_err(db_err)?)?;
            unread.insert(user, row.try_get("unread").map_err(db_err)?);
        }
        Ok(unread)
    }
}

#[async_trait]
impl ConversationRepo for SqliteStore {
    /// `INSERT OR IGNORE` on the deterministic id makes this an idempotent
    /// upsert: a duplicate initiation (even a concurrent one) leaves the
    /// existing record, including its unread flags, untouched.
    async fn upsert(&self, conversation: &Conversation) -> Result<Conversation> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT OR IGNORE INTO conversations
                 (id, ad_id, ad_title, ad_photo, participant_lo, participant_hi, profiles,
                  last_message, last_message_sender_id, last_message_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(conversation.id.to_string())
        .bind(conversation.ad_id.to_string())
        .bind(&conversation.ad_title)
        .bind(&conversation.ad_photo)
        .bind(conversation.participants[0].to_string())
        .bind(conversation.participants[1].to_string())
        .bind(serde_json::to_string(&conversation.profiles).map_err(db_err)?)
        .bind(&conversation.last_message)
        .bind(conversation.last_message_sender_id.map(|id| id.to_string()))
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        for (user_id, unread) in &conversation.unread {
            sqlx::query(
                "INSERT OR IGNORE INTO conversation_unread (conversation_id, user_id, unread)
                 VALUES (?, ?, ?)",
            )
            .bind(conversation.id.to_string())
            .bind(user_id.to_string())
            .bind(*unread)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        self.get(conversation.id)
            .await?
            .ok_or_else(|| AppError::internal("conversation vanished during upsert"))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(row) => {
                let unread = self.unread_rows(id).await?;
                Ok(Some(map_conversation(&row, unread)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let uid = user_id.to_string();
        let rows = sqlx::query(
            "SELECT * FROM conversations
             WHERE participant_lo = ? OR participant_hi = ?
             ORDER BY COALESCE(last_message_at, created_at) DESC",
        )
        .bind(&uid)
        .bind(&uid)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?;
            let unread = self.unread_rows(id).await?;
            conversations.push(map_conversation(row, unread)?);
        }
        Ok(conversations)
    }

    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            conversation_id,
            text: text.to_string(),
            sender_id,
            // Server-assigned: this store *is* the server clock.
            sent_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, text, sender_id, sent_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(&message.text)
        .bind(message.sender_id.to_string())
        .bind(message.sent_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(message)
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY sent_at ASC, id ASC",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_message).collect()
    }

    async fn record_last_message(
        &self,
        conversation_id: Uuid,
        text: &str,
        sender_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE conversations
             SET last_message = ?, last_message_sender_id = ?, last_message_at = ?
             WHERE id = ?",
        )
        .bind(text)
        .bind(sender_id.to_string())
        .bind(sent_at)
        .bind(conversation_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn set_unread(&self, conversation_id: Uuid, user_id: Uuid, unread: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO conversation_unread (conversation_id, user_id, unread)
             VALUES (?, ?, ?)
             ON CONFLICT (conversation_id, user_id) DO UPDATE SET unread = excluded.unread",
        )
        .bind(conversation_id.to_string())
        .bind(user_id.to_string())
        .bind(unread)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::tests::{seed_user, store};

    async fn seeded_conversation(store: &SqliteStore) -> (Conversation, Uuid, Uuid) {
        let buyer = seed_user(store, "buyer").await;
        let seller = seed_user(store, "seller").await;
        let ad_id = Uuid::new_v4();
        let (lo, hi) = if buyer <= seller {
            (buyer, seller)
        } else {
            (seller, buyer)
        };
        let mut profiles = HashMap::new();
        profiles.insert(
            buyer,
            ParticipantProfile {
                name: "buyer".into(),
                photo_url: None,
            },
        );
        profiles.insert(
            seller,
            ParticipantProfile {
                name: "seller".into(),
                photo_url: None,
            },
        );
        let mut unread = HashMap::new();
        unread.insert(buyer, false);
        unread.insert(seller, true);
        let conversation = Conversation {
            id: Conversation::deterministic_id(ad_id, buyer, seller),
            ad_id,
            ad_title: "Power tiller".into(),
            ad_photo: None,
            participants: [lo, hi],
            profiles,
            last_message: None,
            last_message_sender_id: None,
            last_message_at: None,
            unread,
            created_at: Utc::now(),
        };
        (conversation, buyer, seller)
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_preserves_unread_flags() {
        let store = store().await;
        let (conversation, buyer, seller) = seeded_conversation(&store).await;

        let first = store.upsert(&conversation).await.unwrap();
        assert_eq!(first.id, conversation.id);
        assert!(first.unread_for(seller));

        // Recipient reads; a second initiation must not reset their flag.
        store.set_unread(conversation.id, seller, false).await.unwrap();
        let second = store.upsert(&conversation).await.unwrap();
        assert_eq!(second.id, first.id);
        assert!(!second.unread_for(seller));
        assert!(!second.unread_for(buyer));
    }

    #[tokio::test]
    async fn message_log_is_ordered_by_server_timestamp() {
        let store = store().await;
        let (conversation, buyer, _seller) = seeded_conversation(&store).await;
        store.upsert(&conversation).await.unwrap();

        let m1 = store
            .append_message(conversation.id, buyer, "is this available?")
            .await
            .unwrap();
        let m2 = store
            .append_message(conversation.id, buyer, "what is the final price?")
            .await
            .unwrap();

        let log = store.messages(conversation.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].id, m1.id);
        assert_eq!(log[1].id, m2.id);
        assert!(log[0].sent_at <= log[1].sent_at);
        assert_eq!(log.last().unwrap().text, "what is the final price?");
    }

    #[tokio::test]
    async fn last_message_summary_round_trips() {
        let store = store().await;
        let (conversation, buyer, seller) = seeded_conversation(&store).await;
        store.upsert(&conversation).await.unwrap();

        let message = store
            .append_message(conversation.id, buyer, "namaskar")
            .await
            .unwrap();
        store
            .record_last_message(conversation.id, &message.text, buyer, message.sent_at)
            .await
            .unwrap();
        store.set_unread(conversation.id, seller, true).await.unwrap();

        let loaded = ConversationRepo::get(&store, conversation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.last_message.as_deref(), Some("namaskar"));
        assert_eq!(loaded.last_message_sender_id, Some(buyer));
        assert!(loaded.unread_for(seller));

        let for_seller = store.list_for_user(seller).await.unwrap();
        assert_eq!(for_seller.len(), 1);
        assert_eq!(for_seller[0].id, conversation.id);
    }
}
