//! # Support
//!
//! Issue reports and help messages. Issue status advances forward only,
//! by admin action, and each advance notifies the reporter when we know
//! who they are.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use domains::{
    AppError, Caller, HelpMessage, Issue, IssueStatus, Notification, NotificationKind,
    NotificationRepo, Result, SupportRepo,
};

use crate::live::{Change, ChangeHub};

/// Contact-form payload. Signed-in reporters get status notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueReport {
    pub name: String,
    pub email: String,
    pub description: String,
}

#[derive(Clone)]
pub struct SupportService {
    support: Arc<dyn SupportRepo>,
    notifications: Arc<dyn NotificationRepo>,
    hub: ChangeHub,
}

impl SupportService {
    pub fn new(
        support: Arc<dyn SupportRepo>,
        notifications: Arc<dyn NotificationRepo>,
        hub: ChangeHub,
    ) -> Self {
        Self {
            support,
            notifications,
            hub,
        }
    }

    pub async fn report_issue(&self, caller: Option<Caller>, report: IssueReport) -> Result<Issue> {
        if report.description.trim().is_empty() {
            return Err(AppError::Validation("issue description must not be empty".into()));
        }
        let issue = Issue {
            id: Uuid::new_v4(),
            name: report.name,
            email: report.email,
            description: report.description.trim().to_string(),
            status: IssueStatus::New,
            user_id: caller.map(|c| c.id),
            created_at: Utc::now(),
        };
        self.support.insert_issue(&issue).await?;
        Ok(issue)
    }

    /// Forward-only status advance. A skipped `in-progress` is fine; a
    /// step backwards or out of `resolved` is a conflict.
    pub async fn advance_issue(&self, caller: Caller, id: Uuid, next: IssueStatus) -> Result<Issue> {
        caller.require_admin(&format!("issues/{id}"), "advance_status")?;
        let issue = self
            .support
            .get_issue(id)
            .await?
            .ok_or_else(|| AppError::not_found("Issue", id))?;
        if !issue.status.can_advance_to(next) {
            return Err(AppError::Conflict(format!(
                "issue status {} cannot move to {}",
                issue.status.as_str(),
                next.as_str()
            )));
        }

        self.support.set_issue_status(id, next).await?;

        if let Some(reporter) = issue.user_id {
            let notice = Notification::new(
                reporter,
                NotificationKind::IssueStatus,
                "Issue update",
                format!("Your reported issue is now {}.", next.as_str()),
                None,
            );
            self.notifications.insert(&notice).await?;
            self.hub.publish(Change::Notifications(reporter));
        }

        Ok(Issue {
            status: next,
            ..issue
        })
    }

    pub async fn list_issues(&self, caller: Caller) -> Result<Vec<Issue>> {
        caller.require_admin("issues", "list")?;
        self.support.list_issues().await
    }

    pub async fn send_help_message(&self, caller: Caller, email: &str, text: &str) -> Result<HelpMessage> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("help message must not be empty".into()));
        }
        let message = HelpMessage {
            id: Uuid::new_v4(),
            user_id: caller.id,
            user_email: email.to_string(),
            message: text.trim().to_string(),
            created_at: Utc::now(),
        };
        self.support.insert_help_message(&message).await?;
        Ok(message)
    }

    pub async fn list_help_messages(&self, caller: Caller) -> Result<Vec<HelpMessage>> {
        caller.require_admin("help_messages", "list")?;
        self.support.list_help_messages().await
    }
}
