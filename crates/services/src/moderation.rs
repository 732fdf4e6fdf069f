//! # Moderation
//!
//! The pending → approved | rejected state machine. Transitions are
//! admin-only, terminal, and each one fans out exactly one `ad_status`
//! notification to the ad owner.

use std::sync::Arc;

use uuid::Uuid;

use domains::{
    Ad, AdFilter, AdRepo, AdStatus, AppError, Caller, Notification, NotificationKind,
    NotificationRepo, Result,
};

use crate::live::{Change, ChangeHub};

#[derive(Clone)]
pub struct ModerationService {
    ads: Arc<dyn AdRepo>,
    notifications: Arc<dyn NotificationRepo>,
    hub: ChangeHub,
}

impl ModerationService {
    pub fn new(
        ads: Arc<dyn AdRepo>,
        notifications: Arc<dyn NotificationRepo>,
        hub: ChangeHub,
    ) -> Self {
        Self {
            ads,
            notifications,
            hub,
        }
    }

    pub async fn approve(&self, caller: Caller, ad_id: Uuid) -> Result<Ad> {
        caller.require_admin(&format!("ads/{ad_id}"), "approve")?;
        let ad = self.pending_ad(ad_id).await?;

        self.ads.set_status(ad_id, AdStatus::Approved, None).await?;
        tracing::info!(ad = %ad_id, admin = %caller.id, "ad approved");

        let notice = Notification::new(
            ad.user_id,
            NotificationKind::AdStatus,
            "Ad approved",
            format!("Your ad \"{}\" is now live.", ad.title),
            Some(format!("/ads/{ad_id}")),
        );
        self.notifications.insert(&notice).await?;

        self.hub.publish(Change::ApprovedAds);
        self.hub.publish(Change::Notifications(ad.user_id));
        self.ads
            .get(ad_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ad", ad_id))
    }

    pub async fn reject(&self, caller: Caller, ad_id: Uuid, reason: &str) -> Result<Ad> {
        caller.require_admin(&format!("ads/{ad_id}"), "reject")?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "a rejection requires a non-empty reason".into(),
            ));
        }
        let ad = self.pending_ad(ad_id).await?;

        self.ads
            .set_status(ad_id, AdStatus::Rejected, Some(reason.to_string()))
            .await?;
        tracing::info!(ad = %ad_id, admin = %caller.id, reason, "ad rejected");

        let notice = Notification::new(
            ad.user_id,
            NotificationKind::AdStatus,
            "Ad rejected",
            format!("Your ad \"{}\" was rejected: {reason}", ad.title),
            Some(format!("/ads/{ad_id}")),
        );
        self.notifications.insert(&notice).await?;

        self.hub.publish(Change::Notifications(ad.user_id));
        self.ads
            .get(ad_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ad", ad_id))
    }

    /// The moderation queue, oldest submissions first.
    pub async fn pending(&self, caller: Caller) -> Result<Vec<Ad>> {
        caller.require_admin("ads", "list_pending")?;
        self.ads
            .list_by_status(AdStatus::Pending, &AdFilter::default())
            .await
    }

    async fn pending_ad(&self, ad_id: Uuid) -> Result<Ad> {
        let ad = self
            .ads
            .get(ad_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ad", ad_id))?;
        if ad.status != AdStatus::Pending {
            return Err(AppError::Conflict(format!(
                "ad is already {}; moderation is terminal",
                ad.status.as_str()
            )));
        }
        Ok(ad)
    }
}
