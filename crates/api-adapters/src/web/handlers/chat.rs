//! Buyer-seller conversation endpoints.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use domains::models::{ChatMessage, Conversation};
use services::live::{self, Change};

use crate::web::auth::Auth;
use crate::web::error::ApiResult;
use crate::web::AppState;

/// Idempotent: repeat calls for the same ad and pair return the same
/// conversation.
pub async fn start(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(ad_id): Path<Uuid>,
) -> ApiResult<Json<Conversation>> {
    let conversation = state.messaging.start_conversation(caller, ad_id).await?;
    Ok(Json(conversation))
}

pub async fn conversations(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> ApiResult<Json<Vec<Conversation>>> {
    let conversations = state.messaging.conversations(caller).await?;
    Ok(Json(conversations))
}

/// Returns the ordered log and clears the reader's unread flag in the
/// background. The response never waits on the flag write.
pub async fn messages(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let messages = state.messaging.messages(caller, id).await?;
    let messaging = state.messaging.clone();
    tokio::spawn(async move {
        if let Err(err) = messaging.mark_read(caller, id).await {
            tracing::debug!(error = %err, conversation = %id, "deferred mark_read failed");
        }
    });
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub text: String,
}

pub async fn send(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<SendBody>,
) -> ApiResult<Json<ChatMessage>> {
    let message = state.messaging.send_message(caller, id, &body.text).await?;
    Ok(Json(message))
}

/// SSE feed of the caller's conversation list, newest activity first.
pub async fn live(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let messaging = state.messaging.clone();
    let user_id = caller.id;
    let stream = live::snapshots(
        &state.hub,
        move |change| matches!(change, Change::Conversations(id) if *id == user_id),
        move || {
            let messaging = messaging.clone();
            async move { messaging.conversations(caller).await }
        },
    )
    .map(|snapshot| Event::default().json_data(&snapshot));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
