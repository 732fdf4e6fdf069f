use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Moderation lifecycle of an ad. `Pending` on creation; only an
/// administrator moves it to `Approved` or `Rejected`, and both of those
/// are terminal (a re-submitted edit goes back through `Pending`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdStatus::Pending => "pending",
            AdStatus::Approved => "approved",
            AdStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<AdStatus> {
        match s {
            "pending" => Ok(AdStatus::Pending),
            "approved" => Ok(AdStatus::Approved),
            "rejected" => Ok(AdStatus::Rejected),
            other => Err(AppError::Validation(format!("unknown ad status: {other}"))),
        }
    }
}

/// A moderated classified listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Top-level category (e.g., "Livestock", "Equipment")
    pub category: String,
    pub subcategory: Option<String>,
    /// Asking price in whole rupees.
    pub price: i64,
    pub location: String,
    /// Administrative block the seller trades in; used for local filtering.
    pub taluka: Option<String>,
    /// Public URLs of uploaded photos, in display order.
    pub photos: Vec<String>,
    pub mobile_number: Option<String>,
    pub user_id: Uuid,
    pub status: AdStatus,
    /// Present iff status == Rejected; the moderator's stated reason.
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ad {
    /// Visibility rule: non-owners only see approved ads; the owner (and
    /// any administrator) always sees their own regardless of status.
    pub fn visible_to(&self, caller: Option<&crate::Caller>) -> bool {
        if self.status == AdStatus::Approved {
            return true;
        }
        match caller {
            Some(c) => c.id == self.user_id || c.is_admin(),
            None => false,
        }
    }

    pub fn first_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }
}

/// Optional narrowing criteria for public listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilter {
    pub category: Option<String>,
    pub taluka: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Caller, Role};

    fn ad(status: AdStatus, owner: Uuid) -> Ad {
        Ad {
            id: Uuid::new_v4(),
            title: "Pair of bullocks".into(),
            description: "Healthy, 4 years old".into(),
            category: "Livestock".into(),
            subcategory: Some("Cattle".into()),
            price: 45_000,
            location: "Sangamner".into(),
            taluka: Some("Sangamner".into()),
            photos: vec![],
            mobile_number: None,
            user_id: owner,
            status,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn approved_ads_are_public() {
        let ad = ad(AdStatus::Approved, Uuid::new_v4());
        assert!(ad.visible_to(None));
    }

    #[test]
    fn pending_ads_are_hidden_from_non_owners() {
        let owner = Uuid::new_v4();
        let ad = ad(AdStatus::Pending, owner);
        let stranger = Caller {
            id: Uuid::new_v4(),
            role: Role::Farmer,
        };
        let admin = Caller {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let me = Caller {
            id: owner,
            role: Role::Farmer,
        };
        assert!(!ad.visible_to(Some(&stranger)));
        assert!(ad.visible_to(Some(&admin)));
        assert!(ad.visible_to(Some(&me)));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AdStatus::Rejected).unwrap(),
            "\"rejected\""
        );
        assert_eq!(AdStatus::parse("approved").unwrap(), AdStatus::Approved);
    }
}
