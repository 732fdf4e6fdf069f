//! Shared fixtures for the end-to-end test suite: a fully wired service
//! graph over an in-memory SQLite store, with one admin and two farmers
//! already registered.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use mime::Mime;
use uuid::Uuid;

use domains::models::{Caller, Role, User};
use domains::ports::{MediaStorage, UserRepo};
use domains::Result;
use services::{
    AdsService, ChangeHub, DirectoryService, MessagingService, ModerationService,
    NotificationService, PassthroughEnhancer, SiteService, SupportService,
};
use storage_adapters::SqliteStore;

/// Media port that records nothing; photo plumbing is covered at the
/// HTTP layer.
pub struct NullMedia;

#[async_trait]
impl MediaStorage for NullMedia {
    async fn store(&self, _data: Bytes, _content_type: &Mime) -> Result<String> {
        Ok("/media/00/00/null".to_string())
    }
}

pub struct World {
    pub store: Arc<SqliteStore>,
    pub hub: ChangeHub,
    pub ads: AdsService,
    pub messaging: MessagingService,
    pub moderation: ModerationService,
    pub notifications: NotificationService,
    pub support: SupportService,
    pub directory: DirectoryService,
    pub site: SiteService,
    pub admin: Caller,
    pub seller: Caller,
    pub buyer: Caller,
}

pub fn account(name: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{name}@gram-bazaar.test"),
        name: name.to_string(),
        role,
        disabled: false,
        mobile_number: Some("9800000000".to_string()),
        photo_url: None,
        created_at: Utc::now(),
    }
}

impl World {
    pub async fn new() -> World {
        let store = SqliteStore::in_memory()
            .await
            .unwrap_or_else(|err| panic!("in-memory store: {err}"));
        let store = Arc::new(store);

        let admin = account("asha", Role::Admin);
        let seller = account("balu", Role::Farmer);
        let buyer = account("chandra", Role::Farmer);
        for user in [&admin, &seller, &buyer] {
            UserRepo::insert(store.as_ref(), user)
                .await
                .unwrap_or_else(|err| panic!("seed user: {err}"));
        }

        let hub = ChangeHub::default();
        World {
            ads: AdsService::new(
                store.clone(),
                Arc::new(NullMedia),
                Arc::new(PassthroughEnhancer),
                hub.clone(),
            ),
            messaging: MessagingService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                hub.clone(),
            ),
            moderation: ModerationService::new(store.clone(), store.clone(), hub.clone()),
            notifications: NotificationService::new(store.clone(), store.clone(), hub.clone()),
            support: SupportService::new(store.clone(), store.clone(), hub.clone()),
            directory: DirectoryService::new(store.clone()),
            site: SiteService::new(store.clone()),
            admin: Caller {
                id: admin.id,
                role: Role::Admin,
            },
            seller: Caller {
                id: seller.id,
                role: Role::Farmer,
            },
            buyer: Caller {
                id: buyer.id,
                role: Role::Farmer,
            },
            store,
            hub,
        }
    }

    /// Register one more farmer and return their caller identity.
    pub async fn register_farmer(&self, name: &str) -> Caller {
        let user = account(name, Role::Farmer);
        UserRepo::insert(self.store.as_ref(), &user)
            .await
            .unwrap_or_else(|err| panic!("seed user: {err}"));
        Caller {
            id: user.id,
            role: Role::Farmer,
        }
    }
}

pub fn draft(title: &str) -> services::AdDraft {
    services::AdDraft {
        title: title.to_string(),
        description: "Well maintained, single owner.".to_string(),
        category: "equipment".to_string(),
        subcategory: None,
        price: 52_000,
        location: "Kolhapur".to_string(),
        taluka: Some("Karvir".to_string()),
        mobile_number: Some("9800000000".to_string()),
    }
}

pub fn patch(title: &str, description: &str) -> services::AdPatch {
    services::AdPatch {
        title: title.to_string(),
        description: description.to_string(),
        category: "equipment".to_string(),
        subcategory: None,
        price: 52_000,
        location: "Kolhapur".to_string(),
        taluka: Some("Karvir".to_string()),
        mobile_number: Some("9800000000".to_string()),
    }
}
