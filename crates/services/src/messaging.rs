//! # Messaging
//!
//! Conversation initiation, the append-only message log, and per-participant
//! unread tracking. This is the one subsystem where write ordering matters:
//! a send is two dependent writes (append, then summary/unread update) and
//! the second is only attempted once the first has succeeded.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AdRepo, AppError, Caller, ChatMessage, Conversation, ConversationRepo, ParticipantProfile,
    Result, UserRepo,
};

use crate::live::{Change, ChangeHub};

#[derive(Clone)]
pub struct MessagingService {
    conversations: Arc<dyn ConversationRepo>,
    ads: Arc<dyn AdRepo>,
    users: Arc<dyn UserRepo>,
    hub: ChangeHub,
}

impl MessagingService {
    pub fn new(
        conversations: Arc<dyn ConversationRepo>,
        ads: Arc<dyn AdRepo>,
        users: Arc<dyn UserRepo>,
        hub: ChangeHub,
    ) -> Self {
        Self {
            conversations,
            ads,
            users,
            hub,
        }
    }

    /// Find-or-create the conversation between `caller` and the owner of
    /// `ad_id`. Idempotent: the conversation id is a stable function of
    /// (ad, participant pair), so calling this twice, even concurrently,
    /// yields the same record.
    pub async fn start_conversation(&self, caller: Caller, ad_id: Uuid) -> Result<Conversation> {
        let ad = self
            .ads
            .get(ad_id)
            .await?
            .filter(|ad| ad.visible_to(Some(&caller)))
            .ok_or_else(|| AppError::not_found("Ad", ad_id))?;

        let owner_id = ad.user_id;
        if owner_id == caller.id {
            return Err(AppError::Validation(
                "you cannot start a conversation on your own ad".into(),
            ));
        }

        // Profile join at write time. If either lookup fails we abort:
        // a conversation must never exist with an incomplete profile map.
        let viewer = self
            .users
            .get(caller.id)
            .await?
            .ok_or_else(|| AppError::not_found("User", caller.id))?;
        let owner = self
            .users
            .get(owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", owner_id))?;

        let mut profiles = HashMap::new();
        profiles.insert(
            viewer.id,
            ParticipantProfile {
                name: viewer.name.clone(),
                photo_url: viewer.photo_url.clone(),
            },
        );
        profiles.insert(
            owner.id,
            ParticipantProfile {
                name: owner.name.clone(),
                photo_url: owner.photo_url.clone(),
            },
        );

        let mut unread = HashMap::new();
        unread.insert(caller.id, false);
        // The owner has a fresh contact waiting for them.
        unread.insert(owner_id, true);

        let (lo, hi) = if caller.id <= owner_id {
            (caller.id, owner_id)
        } else {
            (owner_id, caller.id)
        };
        let conversation = Conversation {
            id: Conversation::deterministic_id(ad.id, caller.id, owner_id),
            ad_id: ad.id,
            ad_title: ad.title.clone(),
            ad_photo: ad.first_photo().map(str::to_owned),
            participants: [lo, hi],
            profiles,
            last_message: None,
            last_message_sender_id: None,
            last_message_at: None,
            unread,
            created_at: Utc::now(),
        };

        let stored = self.conversations.upsert(&conversation).await?;
        self.hub.publish(Change::Conversations(caller.id));
        self.hub.publish(Change::Conversations(owner_id));
        Ok(stored)
    }

    /// Append a message and refresh the conversation summary.
    ///
    /// Step 2 (summary + recipient unread flag) runs only after step 1
    /// has persisted the message. If step 1 fails the caller still holds
    /// the text and may resubmit; nothing is retried automatically.
    pub async fn send_message(
        &self,
        caller: Caller,
        conversation_id: Uuid,
        text: &str,
    ) -> Result<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("message text must not be empty".into()));
        }

        let conversation = self.participant_conversation(caller, conversation_id, "send_message").await?;
        let recipient = conversation
            .other_participant(caller.id)
            .ok_or_else(|| AppError::internal("two-participant invariant violated"))?;

        // Step 1: the append. Server-assigned timestamp is the canonical order.
        let message = self
            .conversations
            .append_message(conversation_id, caller.id, text)
            .await?;

        // Step 2: the denormalized summary and the recipient's unread flag.
        self.conversations
            .record_last_message(conversation_id, &message.text, caller.id, message.sent_at)
            .await?;
        self.conversations
            .set_unread(conversation_id, recipient, true)
            .await?;

        self.hub.publish(Change::Messages(conversation_id));
        self.hub.publish(Change::Conversations(caller.id));
        self.hub.publish(Change::Conversations(recipient));
        Ok(message)
    }

    /// The full log, server-timestamp ascending.
    pub async fn messages(&self, caller: Caller, conversation_id: Uuid) -> Result<Vec<ChatMessage>> {
        self.participant_conversation(caller, conversation_id, "read_messages")
            .await?;
        self.conversations.messages(conversation_id).await
    }

    /// Flip the caller's own unread flag false. Fire-and-forget from the
    /// reader's perspective; the API layer spawns it while rendering.
    pub async fn mark_read(&self, caller: Caller, conversation_id: Uuid) -> Result<()> {
        self.participant_conversation(caller, conversation_id, "mark_read")
            .await?;
        self.conversations
            .set_unread(conversation_id, caller.id, false)
            .await?;
        self.hub.publish(Change::Conversations(caller.id));
        Ok(())
    }

    /// The caller's conversation list, most recent activity first.
    pub async fn conversations(&self, caller: Caller) -> Result<Vec<Conversation>> {
        self.conversations.list_for_user(caller.id).await
    }

    async fn participant_conversation(
        &self,
        caller: Caller,
        conversation_id: Uuid,
        operation: &str,
    ) -> Result<Conversation> {
        let conversation = self
            .conversations
            .get(conversation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation", conversation_id))?;
        if !conversation.is_participant(caller.id) {
            return Err(AppError::permission_with_detail(
                format!("conversations/{conversation_id}"),
                operation,
                format!("caller={}", caller.id),
            ));
        }
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{
        Ad, AdStatus, MockAdRepo, MockConversationRepo, MockUserRepo, Role, User,
    };
    use mockall::predicate::eq;

    fn caller(id: Uuid) -> Caller {
        Caller {
            id,
            role: Role::Farmer,
        }
    }

    fn approved_ad(owner: Uuid) -> Ad {
        Ad {
            id: Uuid::new_v4(),
            title: "Sonalika tractor".into(),
            description: "2019 model, well maintained".into(),
            category: "Equipment".into(),
            subcategory: None,
            price: 320_000,
            location: "Akole".into(),
            taluka: Some("Akole".into()),
            photos: vec!["/media/ab/cd/tractor".into()],
            mobile_number: None,
            user_id: owner,
            status: AdStatus::Approved,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: Uuid, name: &str) -> User {
        User {
            id,
            email: format!("{name}@example.in"),
            name: name.into(),
            role: Role::Farmer,
            disabled: false,
            mobile_number: None,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    fn conversation_between(ad: &Ad, a: Uuid, b: Uuid) -> Conversation {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Conversation {
            id: Conversation::deterministic_id(ad.id, a, b),
            ad_id: ad.id,
            ad_title: ad.title.clone(),
            ad_photo: ad.first_photo().map(str::to_owned),
            participants: [lo, hi],
            profiles: HashMap::new(),
            last_message: None,
            last_message_sender_id: None,
            last_message_at: None,
            unread: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn start_conversation_builds_profile_join_and_unread_flags() {
        let owner_id = Uuid::new_v4();
        let viewer_id = Uuid::new_v4();
        let ad = approved_ad(owner_id);
        let ad_id = ad.id;

        let mut ads = MockAdRepo::new();
        let ad_clone = ad.clone();
        ads.expect_get()
            .with(eq(ad_id))
            .returning(move |_| Ok(Some(ad_clone.clone())));

        let mut users = MockUserRepo::new();
        users
            .expect_get()
            .with(eq(viewer_id))
            .returning(move |id| Ok(Some(user(id, "Savita"))));
        users
            .expect_get()
            .with(eq(owner_id))
            .returning(move |id| Ok(Some(user(id, "Bhau"))));

        let mut conversations = MockConversationRepo::new();
        conversations.expect_upsert().returning(|c| {
            // The repo hands back what it stored.
            assert_eq!(c.profiles.len(), 2);
            assert_eq!(c.unread.len(), 2);
            Ok(c.clone())
        });

        let svc = MessagingService::new(
            Arc::new(conversations),
            Arc::new(ads),
            Arc::new(users),
            ChangeHub::default(),
        );

        let convo = svc
            .start_conversation(caller(viewer_id), ad_id)
            .await
            .unwrap();
        assert_eq!(convo.id, Conversation::deterministic_id(ad_id, viewer_id, owner_id));
        assert!(convo.unread_for(owner_id), "owner starts with unread=true");
        assert!(!convo.unread_for(viewer_id), "initiator starts with unread=false");
        assert!(convo.is_participant(viewer_id) && convo.is_participant(owner_id));
    }

    #[tokio::test]
    async fn owner_cannot_chat_with_themself() {
        let owner_id = Uuid::new_v4();
        let ad = approved_ad(owner_id);
        let ad_id = ad.id;

        let mut ads = MockAdRepo::new();
        ads.expect_get().returning(move |_| Ok(Some(ad.clone())));

        let svc = MessagingService::new(
            Arc::new(MockConversationRepo::new()),
            Arc::new(ads),
            Arc::new(MockUserRepo::new()),
            ChangeHub::default(),
        );

        let err = svc
            .start_conversation(caller(owner_id), ad_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_profile_aborts_creation() {
        let owner_id = Uuid::new_v4();
        let viewer_id = Uuid::new_v4();
        let ad = approved_ad(owner_id);
        let ad_id = ad.id;

        let mut ads = MockAdRepo::new();
        ads.expect_get().returning(move |_| Ok(Some(ad.clone())));

        let mut users = MockUserRepo::new();
        users
            .expect_get()
            .with(eq(viewer_id))
            .returning(move |id| Ok(Some(user(id, "Savita"))));
        users
            .expect_get()
            .with(eq(owner_id))
            .returning(|_| Ok(None));

        let mut conversations = MockConversationRepo::new();
        // No upsert may ever be attempted.
        conversations.expect_upsert().never();

        let svc = MessagingService::new(
            Arc::new(conversations),
            Arc::new(ads),
            Arc::new(users),
            ChangeHub::default(),
        );

        let err = svc
            .start_conversation(caller(viewer_id), ad_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }

    #[tokio::test]
    async fn send_message_appends_then_updates_summary_and_recipient_flag() {
        let sender_id = Uuid::new_v4();
        let recipient_id = Uuid::new_v4();
        let ad = approved_ad(recipient_id);
        let convo = conversation_between(&ad, sender_id, recipient_id);
        let convo_id = convo.id;
        let sent_at = Utc::now();

        let mut conversations = MockConversationRepo::new();
        let convo_clone = convo.clone();
        conversations
            .expect_get()
            .with(eq(convo_id))
            .returning(move |_| Ok(Some(convo_clone.clone())));
        conversations
            .expect_append_message()
            .with(eq(convo_id), eq(sender_id), eq("is this available?"))
            .returning(move |cid, sid, text| {
                Ok(ChatMessage {
                    id: Uuid::new_v4(),
                    conversation_id: cid,
                    text: text.to_string(),
                    sender_id: sid,
                    sent_at,
                })
            });
        conversations
            .expect_record_last_message()
            .with(eq(convo_id), eq("is this available?"), eq(sender_id), eq(sent_at))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        conversations
            .expect_set_unread()
            .with(eq(convo_id), eq(recipient_id), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = MessagingService::new(
            Arc::new(conversations),
            Arc::new(MockAdRepo::new()),
            Arc::new(MockUserRepo::new()),
            ChangeHub::default(),
        );

        let message = svc
            .send_message(caller(sender_id), convo_id, "  is this available?  ")
            .await
            .unwrap();
        assert_eq!(message.text, "is this available?");
        assert_eq!(message.sender_id, sender_id);
    }

    #[tokio::test]
    async fn failed_append_skips_summary_update() {
        let sender_id = Uuid::new_v4();
        let recipient_id = Uuid::new_v4();
        let ad = approved_ad(recipient_id);
        let convo = conversation_between(&ad, sender_id, recipient_id);
        let convo_id = convo.id;

        let mut conversations = MockConversationRepo::new();
        conversations
            .expect_get()
            .returning(move |_| Ok(Some(convo.clone())));
        conversations
            .expect_append_message()
            .returning(|_, _, _| Err(AppError::internal("store unavailable")));
        conversations.expect_record_last_message().never();
        conversations.expect_set_unread().never();

        let svc = MessagingService::new(
            Arc::new(conversations),
            Arc::new(MockAdRepo::new()),
            Arc::new(MockUserRepo::new()),
            ChangeHub::default(),
        );

        let err = svc
            .send_message(caller(sender_id), convo_id, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn non_participants_cannot_read_or_send() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let ad = approved_ad(b);
        let convo = conversation_between(&ad, a, b);
        let convo_id = convo.id;

        let mut conversations = MockConversationRepo::new();
        conversations
            .expect_get()
            .returning(move |_| Ok(Some(convo.clone())));

        let svc = MessagingService::new(
            Arc::new(conversations),
            Arc::new(MockAdRepo::new()),
            Arc::new(MockUserRepo::new()),
            ChangeHub::default(),
        );

        let err = svc.messages(caller(stranger), convo_id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied { .. }));
        let err = svc
            .send_message(caller(stranger), convo_id, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn mark_read_flips_only_the_callers_flag() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ad = approved_ad(b);
        let convo = conversation_between(&ad, a, b);
        let convo_id = convo.id;

        let mut conversations = MockConversationRepo::new();
        conversations
            .expect_get()
            .returning(move |_| Ok(Some(convo.clone())));
        conversations
            .expect_set_unread()
            .with(eq(convo_id), eq(a), eq(false))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = MessagingService::new(
            Arc::new(conversations),
            Arc::new(MockAdRepo::new()),
            Arc::new(MockUserRepo::new()),
            ChangeHub::default(),
        );
        svc.mark_read(caller(a), convo_id).await.unwrap();
    }
}
