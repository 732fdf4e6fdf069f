//! Admin endpoints. Role checks happen inside the services, so a farmer
//! hitting these routes gets a clean 403 with an audit log entry rather
//! than a routing-level rejection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use domains::models::{
    Ad, AdvertisementConfig, HelpMessage, Issue, IssueStatus, PaymentConfig, User,
};

use crate::web::auth::Auth;
use crate::web::error::ApiResult;
use crate::web::AppState;

pub async fn pending_ads(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Vec<Ad>>> {
    let ads = state.moderation.pending(caller).await?;
    Ok(Json(ads))
}

pub async fn approve_ad(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Ad>> {
    let ad = state.moderation.approve(caller, id).await?;
    Ok(Json(ad))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub reason: String,
}

pub async fn reject_ad(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> ApiResult<Json<Ad>> {
    let ad = state.moderation.reject(caller, id, &body.reason).await?;
    Ok(Json(ad))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastBody {
    pub title: String,
    pub message: String,
}

pub async fn broadcast(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(body): Json<BroadcastBody>,
) -> ApiResult<Json<Value>> {
    let recipients = state
        .notifications
        .broadcast(caller, &body.title, &body.message)
        .await?;
    Ok(Json(json!({ "recipients": recipients })))
}

pub async fn list_users(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.directory.list_users(caller).await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct DisabledBody {
    pub disabled: bool,
}

pub async fn set_disabled(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<DisabledBody>,
) -> ApiResult<StatusCode> {
    state.directory.set_disabled(caller, id, body.disabled).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_issues(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Vec<Issue>>> {
    let issues = state.support.list_issues(caller).await?;
    Ok(Json(issues))
}

#[derive(Debug, Deserialize)]
pub struct IssueStatusBody {
    pub status: IssueStatus,
}

pub async fn advance_issue(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<IssueStatusBody>,
) -> ApiResult<Json<Issue>> {
    let issue = state.support.advance_issue(caller, id, body.status).await?;
    Ok(Json(issue))
}

pub async fn list_help_messages(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Vec<HelpMessage>>> {
    let messages = state.support.list_help_messages(caller).await?;
    Ok(Json(messages))
}

pub async fn set_advertisement(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(config): Json<AdvertisementConfig>,
) -> ApiResult<Json<AdvertisementConfig>> {
    let config = state.site.set_advertisement(caller, config).await?;
    Ok(Json(config))
}

pub async fn set_payment(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(config): Json<PaymentConfig>,
) -> ApiResult<Json<PaymentConfig>> {
    let config = state.site.set_payment(caller, config).await?;
    Ok(Json(config))
}
