//! Axum wiring: shared state, the bearer-token extractor, error mapping
//! and the route table. Handlers stay thin; every decision that matters
//! lives in the services.

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use domains::ports::IdentityProvider;
use services::{
    AdsService, ChangeHub, DirectoryService, MessagingService, ModerationService,
    NotificationService, SiteService, SupportService,
};

pub use auth::{Auth, MaybeAuth};
pub use error::{ApiError, ApiResult};

/// Everything a handler can reach. Cheap to clone: services hold `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub ads: AdsService,
    pub messaging: MessagingService,
    pub moderation: ModerationService,
    pub notifications: NotificationService,
    pub support: SupportService,
    pub directory: DirectoryService,
    pub site: SiteService,
    pub hub: ChangeHub,
    pub identity: Arc<dyn IdentityProvider>,
}

/// The full route table, CORS-open and trace-logged.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        // Public marketplace
        .route("/ads", get(handlers::ads::list).post(handlers::ads::create))
        .route("/ads/live", get(handlers::ads::live))
        .route(
            "/ads/{id}",
            get(handlers::ads::fetch).put(handlers::ads::update),
        )
        .route("/ads/{id}/photos", post(handlers::ads::upload_photo))
        .route("/ads/{id}/enhance", post(handlers::ads::enhance))
        .route("/ads/{id}/chat", post(handlers::chat::start))
        .route("/my/ads", get(handlers::ads::mine))
        // Conversations
        .route("/conversations", get(handlers::chat::conversations))
        .route("/conversations/live", get(handlers::chat::live))
        .route(
            "/conversations/{id}/messages",
            get(handlers::chat::messages).post(handlers::chat::send),
        )
        // Notifications
        .route("/notifications", get(handlers::notices::list))
        .route("/notifications/live", get(handlers::notices::live))
        .route("/notifications/unread-count", get(handlers::notices::unread_count))
        .route("/notifications/{id}/read", post(handlers::notices::mark_read))
        .route("/notifications/{id}", delete(handlers::notices::remove))
        // Support
        .route("/issues", post(handlers::support::report_issue))
        .route("/help", post(handlers::support::send_help))
        // Site documents (public read)
        .route("/config/advertisement", get(handlers::site::advertisement))
        .route("/config/payment", get(handlers::site::payment))
        // Admin
        .route("/admin/ads/pending", get(handlers::admin::pending_ads))
        .route("/admin/ads/{id}/approve", post(handlers::admin::approve_ad))
        .route("/admin/ads/{id}/reject", post(handlers::admin::reject_ad))
        .route("/admin/broadcast", post(handlers::admin::broadcast))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/disabled", post(handlers::admin::set_disabled))
        .route("/admin/issues", get(handlers::admin::list_issues))
        .route("/admin/issues/{id}/status", post(handlers::admin::advance_issue))
        .route("/admin/help-messages", get(handlers::admin::list_help_messages))
        .route(
            "/admin/config/advertisement",
            put(handlers::admin::set_advertisement),
        )
        .route("/admin/config/payment", put(handlers::admin::set_payment))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
