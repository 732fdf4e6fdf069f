//! # AppError
//!
//! Centralized error handling for the Gram-Bazaar ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Ad, Conversation, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty message text, missing rejection reason)
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller could not be identified (missing/expired/garbled token,
    /// or the account has been disabled)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is known but lacks the role/ownership for the operation.
    /// Carries contextual metadata so the API layer can route it through
    /// the dedicated permission channel, separate from generic failures.
    #[error("permission denied: {operation} on {path}")]
    PermissionDenied {
        /// Resource path the caller attempted to touch (e.g., "ads/<id>")
        path: String,
        /// The attempted operation (e.g., "approve", "broadcast")
        operation: String,
        /// Optional payload/context snippet for the audit log
        detail: Option<String>,
    },

    /// State conflict (e.g., moderating an already-moderated ad)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., store unavailable, blob write failed)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Gram-Bazaar logic.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }

    pub fn permission(path: impl Into<String>, operation: impl Into<String>) -> Self {
        AppError::PermissionDenied {
            path: path.into(),
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn permission_with_detail(
        path: impl Into<String>,
        operation: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        AppError::PermissionDenied {
            path: path.into(),
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_error_carries_context() {
        let err = AppError::permission_with_detail("ads/42", "approve", "role=Farmer");
        match err {
            AppError::PermissionDenied {
                path,
                operation,
                detail,
            } => {
                assert_eq!(path, "ads/42");
                assert_eq!(operation, "approve");
                assert_eq!(detail.as_deref(), Some("role=Farmer"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn not_found_formats_kind_and_id() {
        let err = AppError::not_found("Ad", "abc");
        assert_eq!(err.to_string(), "Ad not found with ID abc");
    }
}
