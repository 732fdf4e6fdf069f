//! Marketplace listing endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use mime::Mime;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use domains::models::{Ad, AdFilter};
use domains::AppError;
use services::live::{self, Change};
use services::{AdDraft, AdPatch};

use crate::web::auth::{Auth, MaybeAuth};
use crate::web::error::ApiResult;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub taluka: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> AdFilter {
        AdFilter {
            category: self.category,
            taluka: self.taluka,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Ad>>> {
    let ads = state.ads.list_approved(&query.into_filter()).await?;
    Ok(Json(ads))
}

pub async fn create(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(draft): Json<AdDraft>,
) -> ApiResult<Json<Ad>> {
    let ad = state.ads.post_ad(caller, draft).await?;
    Ok(Json(ad))
}

pub async fn fetch(
    State(state): State<AppState>,
    MaybeAuth(caller): MaybeAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Ad>> {
    let ad = state.ads.get_ad(caller.as_ref(), id).await?;
    Ok(Json(ad))
}

pub async fn update(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
    Json(patch): Json<AdPatch>,
) -> ApiResult<Json<Ad>> {
    let ad = state.ads.update_ad(caller, id, patch).await?;
    Ok(Json(ad))
}

pub async fn mine(State(state): State<AppState>, Auth(caller): Auth) -> ApiResult<Json<Vec<Ad>>> {
    let ads = state.ads.list_mine(caller).await?;
    Ok(Json(ads))
}

/// Accepts the first `photo` part of the multipart body. The declared
/// content type wins; the filename extension is the fallback.
pub async fn upload_photo(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<Ad>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("malformed multipart body: {err}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let declared = field
            .content_type()
            .and_then(|value| value.parse::<Mime>().ok());
        let guessed = field
            .file_name()
            .and_then(|name| mime_guess::from_path(name).first());
        let content_type = declared
            .or(guessed)
            .ok_or_else(|| AppError::Validation("photo has no recognizable content type".into()))?;
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(format!("failed to read photo upload: {err}")))?;
        let ad = state.ads.attach_photo(caller, id, data, &content_type).await?;
        return Ok(Json(ad));
    }
    Err(AppError::Validation("multipart body is missing a 'photo' field".into()).into())
}

#[derive(Debug, Deserialize)]
pub struct EnhanceBody {
    pub text: String,
}

pub async fn enhance(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(body): Json<EnhanceBody>,
) -> ApiResult<Json<Value>> {
    let text = state.ads.enhance_description(caller, &body.text).await?;
    Ok(Json(json!({ "text": text })))
}

/// SSE feed of the approved listing. Every event carries the whole
/// current result set.
pub async fn live(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let ads = state.ads.clone();
    let stream = live::snapshots(
        &state.hub,
        |change| matches!(change, Change::ApprovedAds),
        move || {
            let ads = ads.clone();
            async move { ads.list_approved(&AdFilter::default()).await }
        },
    )
    .map(|snapshot| Event::default().json_data(&snapshot));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
