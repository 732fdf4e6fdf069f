use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// What produced a notification. Kept coarse on purpose; the UI only
/// branches on these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AdStatus,
    IssueStatus,
    Broadcast,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AdStatus => "ad_status",
            NotificationKind::IssueStatus => "issue_status",
            NotificationKind::Broadcast => "broadcast",
        }
    }

    pub fn parse(s: &str) -> Result<NotificationKind> {
        match s {
            "ad_status" => Ok(NotificationKind::AdStatus),
            "issue_status" => Ok(NotificationKind::IssueStatus),
            "broadcast" => Ok(NotificationKind::Broadcast),
            other => Err(AppError::Validation(format!(
                "unknown notification kind: {other}"
            ))),
        }
    }
}

/// A one-way informational record about exactly one recipient.
/// Mutated only to flip `is_read`; deletable by an admin or the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    /// Optional deep link into the app (e.g., "/ads/<id>").
    pub link: Option<String>,
    pub is_read: bool,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            message: message.into(),
            link,
            is_read: false,
            kind,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notifications_start_unread() {
        let n = Notification::new(
            Uuid::new_v4(),
            NotificationKind::Broadcast,
            "Market day",
            "Weekly market moved to Tuesday",
            None,
        );
        assert!(!n.is_read);
        assert_eq!(n.kind.as_str(), "broadcast");
    }
}
