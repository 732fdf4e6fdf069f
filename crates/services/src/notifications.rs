//! # Notifications
//!
//! Per-user notification records plus the admin broadcast fan-out.
//! Broadcast is a single all-or-nothing batch: either every user existing
//! at send time gets a record, or none do.

use std::sync::Arc;

use uuid::Uuid;

use domains::{
    AppError, Caller, Notification, NotificationKind, NotificationRepo, Result, UserRepo,
};

use crate::live::{Change, ChangeHub};

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepo>,
    users: Arc<dyn UserRepo>,
    hub: ChangeHub,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepo>,
        users: Arc<dyn UserRepo>,
        hub: ChangeHub,
    ) -> Self {
        Self {
            notifications,
            users,
            hub,
        }
    }

    /// One notification per user existing right now. Returns how many were
    /// written. A failed batch writes nothing and is not retried.
    pub async fn broadcast(&self, caller: Caller, title: &str, message: &str) -> Result<usize> {
        caller.require_admin("notifications", "broadcast")?;
        let title = title.trim();
        let message = message.trim();
        if title.is_empty() || message.is_empty() {
            return Err(AppError::Validation(
                "broadcast title and message must not be empty".into(),
            ));
        }

        let recipients = self.users.list().await?;
        let batch: Vec<Notification> = recipients
            .iter()
            .map(|user| {
                Notification::new(user.id, NotificationKind::Broadcast, title, message, None)
            })
            .collect();

        self.notifications.insert_batch(&batch).await?;
        tracing::info!(count = batch.len(), admin = %caller.id, "broadcast sent");

        for user in &recipients {
            self.hub.publish(Change::Notifications(user.id));
        }
        Ok(batch.len())
    }

    /// The caller's notifications, newest first.
    pub async fn list_for(&self, caller: Caller) -> Result<Vec<Notification>> {
        self.notifications.list_for_user(caller.id).await
    }

    pub async fn unread_count(&self, caller: Caller) -> Result<u64> {
        self.notifications.unread_count(caller.id).await
    }

    pub async fn mark_read(&self, caller: Caller, id: Uuid) -> Result<()> {
        self.owned(caller, id, "mark_read").await?;
        self.notifications.set_read(id, true).await?;
        self.hub.publish(Change::Notifications(caller.id));
        Ok(())
    }

    /// Recipients may delete their own records; admins may delete any.
    pub async fn delete(&self, caller: Caller, id: Uuid) -> Result<()> {
        let recipient = self.owned(caller, id, "delete").await?;
        self.notifications.delete(id).await?;
        self.hub.publish(Change::Notifications(recipient));
        Ok(())
    }

    async fn owned(&self, caller: Caller, id: Uuid, operation: &str) -> Result<Uuid> {
        let notification = self
            .notifications
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification", id))?;
        if notification.user_id != caller.id && !caller.is_admin() {
            return Err(AppError::permission_with_detail(
                format!("notifications/{id}"),
                operation,
                format!("caller={}", caller.id),
            ));
        }
        Ok(notification.user_id)
    }
}
