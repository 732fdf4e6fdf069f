//! Issue reports and help-desk messages.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use domains::models::{HelpMessage, Issue};
use services::IssueReport;

use crate::web::auth::{Auth, MaybeAuth};
use crate::web::error::ApiResult;
use crate::web::AppState;

/// Anonymous reports are accepted; a signed-in reporter additionally
/// gets status notifications later.
pub async fn report_issue(
    State(state): State<AppState>,
    MaybeAuth(caller): MaybeAuth,
    Json(report): Json<IssueReport>,
) -> ApiResult<Json<Issue>> {
    let issue = state.support.report_issue(caller, report).await?;
    Ok(Json(issue))
}

#[derive(Debug, Deserialize)]
pub struct HelpBody {
    pub email: String,
    pub text: String,
}

pub async fn send_help(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(body): Json<HelpBody>,
) -> ApiResult<Json<HelpMessage>> {
    let message = state
        .support
        .send_help_message(caller, &body.email, &body.text)
        .await?;
    Ok(Json(message))
}
