use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Denormalized display data for one participant, joined from `users`
/// at conversation-creation time so list views never fan out into
/// per-row profile lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub name: String,
    pub photo_url: Option<String>,
}

/// A chat thread scoped to exactly one ad and two participants.
///
/// Identity is deterministic: [`Conversation::deterministic_id`] hashes the
/// ad id together with the sorted participant pair, so "find or create"
/// is an idempotent upsert instead of a racy check-then-insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub ad_id: Uuid,
    pub ad_title: String,
    pub ad_photo: Option<String>,
    /// Exactly two distinct identities, stored sorted.
    pub participants: [Uuid; 2],
    pub profiles: HashMap<Uuid, ParticipantProfile>,
    pub last_message: Option<String>,
    pub last_message_sender_id: Option<Uuid>,
    pub last_message_at: Option<DateTime<Utc>>,
    /// Per-participant "has unseen messages" flags.
    pub unread: HashMap<Uuid, bool>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Stable conversation id for an (ad, unordered pair) triple.
    pub fn deterministic_id(ad_id: Uuid, a: Uuid, b: Uuid) -> Uuid {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let name = format!("{ad_id}:{lo}:{hi}");
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }

    /// The counterpart of `user_id`, if they are a participant at all.
    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        match self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    pub fn unread_for(&self, user_id: Uuid) -> bool {
        self.unread.get(&user_id).copied().unwrap_or(false)
    }
}

/// One immutable entry in a conversation's append-only message log.
/// `sent_at` is assigned by the store at insertion; readers must order
/// by it, not by client submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub text: String,
    pub sender_id: Uuid,
    pub sent_at: DateTime<Utc>,
}
