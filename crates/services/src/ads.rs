//! # Ads
//!
//! CRUD around the moderated listing lifecycle. Creation and owner edits
//! always land in `pending`; the visibility rule lives on the model and is
//! applied on every read path.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use mime::Mime;
use serde::Deserialize;
use uuid::Uuid;

use domains::{
    Ad, AdFilter, AdRepo, AdStatus, AppError, Caller, DescriptionEnhancer, MediaStorage, Result,
};

use crate::live::{Change, ChangeHub};

/// Form payload for a new listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: i64,
    pub location: String,
    pub taluka: Option<String>,
    pub mobile_number: Option<String>,
}

/// Owner edit; every field is a full replacement (form re-submission).
#[derive(Debug, Clone, Deserialize)]
pub struct AdPatch {
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: i64,
    pub location: String,
    pub taluka: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Clone)]
pub struct AdsService {
    ads: Arc<dyn AdRepo>,
    media: Arc<dyn MediaStorage>,
    enhancer: Arc<dyn DescriptionEnhancer>,
    hub: ChangeHub,
}

impl AdsService {
    pub fn new(
        ads: Arc<dyn AdRepo>,
        media: Arc<dyn MediaStorage>,
        enhancer: Arc<dyn DescriptionEnhancer>,
        hub: ChangeHub,
    ) -> Self {
        Self {
            ads,
            media,
            enhancer,
            hub,
        }
    }

    pub async fn post_ad(&self, caller: Caller, draft: AdDraft) -> Result<Ad> {
        validate_listing(&draft.title, &draft.description, &draft.category, draft.price)?;
        let now = Utc::now();
        let ad = Ad {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            subcategory: draft.subcategory,
            price: draft.price,
            location: draft.location,
            taluka: draft.taluka,
            photos: Vec::new(),
            mobile_number: draft.mobile_number,
            user_id: caller.id,
            status: AdStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.ads.insert(&ad).await?;
        tracing::debug!(ad = %ad.id, owner = %caller.id, "ad submitted for review");
        Ok(ad)
    }

    /// Visibility-gated fetch. Hidden ads are reported as absent so their
    /// existence does not leak to strangers.
    pub async fn get_ad(&self, caller: Option<&Caller>, ad_id: Uuid) -> Result<Ad> {
        self.ads
            .get(ad_id)
            .await?
            .filter(|ad| ad.visible_to(caller))
            .ok_or_else(|| AppError::not_found("Ad", ad_id))
    }

    pub async fn list_approved(&self, filter: &AdFilter) -> Result<Vec<Ad>> {
        self.ads.list_by_status(AdStatus::Approved, filter).await
    }

    pub async fn list_mine(&self, caller: Caller) -> Result<Vec<Ad>> {
        self.ads.list_by_owner(caller.id).await
    }

    /// Owner re-submission: the edited ad re-enters the moderation queue
    /// and any previous rejection reason is cleared.
    pub async fn update_ad(&self, caller: Caller, ad_id: Uuid, patch: AdPatch) -> Result<Ad> {
        validate_listing(&patch.title, &patch.description, &patch.category, patch.price)?;
        let mut ad = self.owned_ad(caller, ad_id, "update").await?;
        let was_public = ad.status == AdStatus::Approved;

        ad.title = patch.title.trim().to_string();
        ad.description = patch.description.trim().to_string();
        ad.category = patch.category;
        ad.subcategory = patch.subcategory;
        ad.price = patch.price;
        ad.location = patch.location;
        ad.taluka = patch.taluka;
        ad.mobile_number = patch.mobile_number;
        ad.status = AdStatus::Pending;
        ad.rejection_reason = None;
        ad.updated_at = Utc::now();

        self.ads.update(&ad).await?;
        if was_public {
            // The edit pulled an approved ad back into the review queue.
            self.hub.publish(Change::ApprovedAds);
        }
        Ok(ad)
    }

    /// Store the bytes through the media port and append the returned URL.
    pub async fn attach_photo(
        &self,
        caller: Caller,
        ad_id: Uuid,
        data: Bytes,
        content_type: &Mime,
    ) -> Result<Ad> {
        if data.is_empty() {
            return Err(AppError::Validation("empty photo upload".into()));
        }
        let mut ad = self.owned_ad(caller, ad_id, "attach_photo").await?;
        let url = self.media.store(data, content_type).await?;
        ad.photos.push(url);
        ad.updated_at = Utc::now();
        self.ads.update(&ad).await?;
        Ok(ad)
    }

    /// Optional description polish via the external text endpoint.
    pub async fn enhance_description(&self, _caller: Caller, text: &str) -> Result<String> {
        self.enhancer.enhance(text).await
    }

    async fn owned_ad(&self, caller: Caller, ad_id: Uuid, operation: &str) -> Result<Ad> {
        let ad = self
            .ads
            .get(ad_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ad", ad_id))?;
        if ad.user_id != caller.id {
            return Err(AppError::permission_with_detail(
                format!("ads/{ad_id}"),
                operation,
                format!("caller={}", caller.id),
            ));
        }
        Ok(ad)
    }
}

fn validate_listing(title: &str, description: &str, category: &str, price: i64) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if description.trim().is_empty() {
        return Err(AppError::Validation("description must not be empty".into()));
    }
    if category.trim().is_empty() {
        return Err(AppError::Validation("category must not be empty".into()));
    }
    if price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    Ok(())
}
