//! Notification endpoints for the signed-in caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde_json::{json, Value};
use uuid::Uuid;

use domains::models::Notification;
use services::live::{self, Change};

use crate::web::auth::Auth;
use crate::web::error::ApiResult;
use crate::web::AppState;

pub async fn list(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state.notifications.list_for(caller).await?;
    Ok(Json(notifications))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Value>> {
    let count = state.notifications.unread_count(caller).await?;
    Ok(Json(json!({ "unread": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.notifications.mark_read(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.notifications.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// SSE feed of the caller's notification list.
pub async fn live(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let notifications = state.notifications.clone();
    let user_id = caller.id;
    let stream = live::snapshots(
        &state.hub,
        move |change| matches!(change, Change::Notifications(id) if *id == user_id),
        move || {
            let notifications = notifications.clone();
            async move { notifications.list_for(caller).await }
        },
    )
    .map(|snapshot| Event::default().json_data(&snapshot));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
