use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Lifecycle of a reported issue. Advances forward only, by admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    New,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::New => "new",
            IssueStatus::InProgress => "in-progress",
            IssueStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Result<IssueStatus> {
        match s {
            "new" => Ok(IssueStatus::New),
            "in-progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            other => Err(AppError::Validation(format!(
                "unknown issue status: {other}"
            ))),
        }
    }

    /// Forward-only: `new → in-progress → resolved`, skipping allowed,
    /// never backwards, never out of `resolved`.
    pub fn can_advance_to(&self, next: IssueStatus) -> bool {
        next > *self
    }
}

/// A problem report filed through the contact form. `user_id` is present
/// when the reporter was signed in, enabling status-change notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub description: String,
    pub status: IssueStatus,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A free-form "ask for help" note from a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
