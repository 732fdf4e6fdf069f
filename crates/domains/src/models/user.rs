use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Role of a registered account. `Farmer` is the default for self-service
/// sign-ups; `Admin` accounts moderate ads and manage the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Farmer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "Farmer",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Result<Role> {
        match s {
            "Farmer" => Ok(Role::Farmer),
            "Admin" => Ok(Role::Admin),
            other => Err(AppError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Disabled accounts fail identity resolution; their data stays intact.
    pub disabled: bool,
    pub mobile_number: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The resolved identity of the caller of an operation, produced by the
/// identity port from a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail-fast role gate: admin-only operations call this before touching
    /// the store, so a misbehaving client is rejected with full context
    /// instead of relying on backend rejection.
    pub fn require_admin(&self, path: &str, operation: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::permission_with_detail(
                path,
                operation,
                format!("caller={} role={}", self.id, self.role.as_str()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Farmer, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("Buyer").is_err());
    }

    #[test]
    fn require_admin_rejects_farmers_with_context() {
        let caller = Caller {
            id: Uuid::new_v4(),
            role: Role::Farmer,
        };
        let err = caller.require_admin("ads/1", "approve").unwrap_err();
        match err {
            crate::AppError::PermissionDenied { operation, .. } => {
                assert_eq!(operation, "approve")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
