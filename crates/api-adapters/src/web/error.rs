//! Maps [`AppError`] onto HTTP. Permission denials take a detour through
//! the `gb::permission` tracing target so the audit trail is one grep away
//! from the rest of the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domains::AppError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Newtype so we can hang `IntoResponse` on the domain error.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied {
                path,
                operation,
                detail,
            } => {
                tracing::warn!(
                    target: "gb::permission",
                    path = %path,
                    operation = %operation,
                    detail = detail.as_deref().unwrap_or(""),
                    "permission denied"
                );
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
