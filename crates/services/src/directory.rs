//! Admin user directory: listing accounts and the enable/disable toggle.

use std::sync::Arc;

use uuid::Uuid;

use domains::{AppError, Caller, Result, User, UserRepo};

#[derive(Clone)]
pub struct DirectoryService {
    users: Arc<dyn UserRepo>,
}

impl DirectoryService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn list_users(&self, caller: Caller) -> Result<Vec<User>> {
        caller.require_admin("users", "list")?;
        self.users.list().await
    }

    /// Disabled accounts fail identity resolution on their next request;
    /// nothing else about them is touched.
    pub async fn set_disabled(&self, caller: Caller, user_id: Uuid, disabled: bool) -> Result<()> {
        caller.require_admin(&format!("users/{user_id}"), "set_disabled")?;
        if caller.id == user_id {
            return Err(AppError::Validation(
                "you cannot disable your own account".into(),
            ));
        }
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;
        self.users.set_disabled(user_id, disabled).await
    }
}
