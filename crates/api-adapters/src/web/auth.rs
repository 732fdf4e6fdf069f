//! Bearer-token extractors. `Auth` rejects anonymous requests with 401;
//! `MaybeAuth` lets them through as `None` but still rejects a token
//! that is present and bad, so a stale token never silently downgrades
//! to the public view.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use domains::models::Caller;
use domains::AppError;

use super::error::ApiError;
use super::AppState;

/// An authenticated caller, resolved through the identity port.
#[derive(Debug, Clone, Copy)]
pub struct Auth(pub Caller);

/// An optionally-authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuth(pub Option<Caller>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
        let caller = state.identity.resolve(token).await?;
        Ok(Auth(caller))
    }
}

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(MaybeAuth(None)),
            Some(token) => {
                let caller = state.identity.resolve(token).await?;
                Ok(MaybeAuth(Some(caller)))
            }
        }
    }
}
