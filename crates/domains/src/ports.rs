//! # Core Ports
//!
//! Contracts every adapter must implement. Services depend only on these
//! traits; the binary picks the concrete plugins at composition time.
//!
//! With the `testing` feature (or inside this crate's own tests) each trait
//! gains a mockall-generated `MockXxx` companion.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use mime::Mime;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Ad, AdFilter, AdStatus, AdvertisementConfig, Caller, ChatMessage, Conversation, HelpMessage,
    Issue, IssueStatus, Notification, PaymentConfig, User,
};

/// Persistence contract for registered accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<User>>;
    /// Every account, newest first. Broadcast fan-out enumerates this.
    async fn list(&self) -> Result<Vec<User>>;
    async fn set_disabled(&self, id: Uuid, disabled: bool) -> Result<()>;
}

/// Persistence contract for classified ads.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AdRepo: Send + Sync {
    async fn insert(&self, ad: &Ad) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Ad>>;
    /// Full-record update; `updated_at` is the caller's responsibility.
    async fn update(&self, ad: &Ad) -> Result<()>;
    async fn list_by_status(&self, status: AdStatus, filter: &AdFilter) -> Result<Vec<Ad>>;
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Ad>>;
    /// Moderation write: status plus the rejection reason column in one go.
    async fn set_status(
        &self,
        id: Uuid,
        status: AdStatus,
        rejection_reason: Option<String>,
    ) -> Result<()>;
}

/// Persistence contract for conversations and their message logs.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ConversationRepo: Send + Sync {
    /// Idempotent insert keyed on the conversation's deterministic id:
    /// if a record with the same id already exists it is left untouched
    /// and returned as-is.
    async fn upsert(&self, conversation: &Conversation) -> Result<Conversation>;
    async fn get(&self, id: Uuid) -> Result<Option<Conversation>>;
    /// Conversations the user participates in, most recent activity first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>>;
    /// Append one immutable message; the store assigns `sent_at`.
    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<ChatMessage>;
    /// The full log, ordered by `sent_at` ascending.
    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>>;
    /// Refresh the denormalized last-message preview fields.
    async fn record_last_message(
        &self,
        conversation_id: Uuid,
        text: &str,
        sender_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<()>;
    /// Flip one participant's unread flag. Distinct participants map to
    /// distinct rows, so concurrent sender/reader writes cannot clobber
    /// each other.
    async fn set_unread(&self, conversation_id: Uuid, user_id: Uuid, unread: bool) -> Result<()>;
}

/// Persistence contract for per-user notifications.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<()>;
    /// All-or-nothing batch insert. On failure zero records exist.
    async fn insert_batch(&self, batch: &[Notification]) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Notification>>;
    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;
    async fn set_read(&self, id: Uuid, is_read: bool) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn unread_count(&self, user_id: Uuid) -> Result<u64>;
}

/// Persistence contract for issues and help messages.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SupportRepo: Send + Sync {
    async fn insert_issue(&self, issue: &Issue) -> Result<()>;
    async fn get_issue(&self, id: Uuid) -> Result<Option<Issue>>;
    async fn list_issues(&self) -> Result<Vec<Issue>>;
    async fn set_issue_status(&self, id: Uuid, status: IssueStatus) -> Result<()>;
    async fn insert_help_message(&self, message: &HelpMessage) -> Result<()>;
    async fn list_help_messages(&self) -> Result<Vec<HelpMessage>>;
}

/// Persistence contract for singleton site-config documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SiteConfigRepo: Send + Sync {
    async fn advertisement(&self) -> Result<AdvertisementConfig>;
    async fn set_advertisement(&self, config: &AdvertisementConfig) -> Result<()>;
    async fn payment(&self) -> Result<PaymentConfig>;
    async fn set_payment(&self, config: &PaymentConfig) -> Result<()>;
}

/// Blob-store contract: persist bytes, hand back a retrievable URL.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn store(&self, data: Bytes, content_type: &Mime) -> Result<String>;
}

/// External text-improvement endpoint used as an optional ad-description
/// enhancer. Interface only; the default plugin is a passthrough.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DescriptionEnhancer: Send + Sync {
    async fn enhance(&self, text: &str) -> Result<String>;
}

/// Identity-provider contract: map a bearer credential to the caller,
/// rejecting unknown or disabled accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Caller>;
}
