//! Public reads of the site configuration documents.

use axum::extract::State;
use axum::Json;

use domains::models::{AdvertisementConfig, PaymentConfig};

use crate::web::error::ApiResult;
use crate::web::AppState;

pub async fn advertisement(State(state): State<AppState>) -> ApiResult<Json<AdvertisementConfig>> {
    let config = state.site.advertisement().await?;
    Ok(Json(config))
}

pub async fn payment(State(state): State<AppState>) -> ApiResult<Json<PaymentConfig>> {
    let config = state.site.payment().await?;
    Ok(Json(config))
}
