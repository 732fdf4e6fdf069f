//! Gram-Bazaar entrypoint: load settings, open the store, wire every
//! service to one ChangeHub, then serve the Axum router.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::web::{self, AppState};
use auth_adapters::JwtIdentity;
use configs::Settings;
use services::{
    AdsService, ChangeHub, DirectoryService, MessagingService, ModerationService,
    NotificationService, PassthroughEnhancer, SiteService, SupportService,
};
use storage_adapters::{LocalMediaStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configs::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("loading settings")?;

    let store = SqliteStore::connect(&settings.database.url)
        .await
        .context("opening sqlite store")?;
    let repo = Arc::new(store);

    let media = Arc::new(LocalMediaStore::new(
        PathBuf::from(&settings.media.root),
        settings.media.url_prefix.clone(),
    ));
    let identity = Arc::new(JwtIdentity::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        repo.clone(),
    ));

    let hub = ChangeHub::default();
    let state = AppState {
        ads: AdsService::new(
            repo.clone(),
            media,
            Arc::new(PassthroughEnhancer),
            hub.clone(),
        ),
        messaging: MessagingService::new(repo.clone(), repo.clone(), repo.clone(), hub.clone()),
        moderation: ModerationService::new(repo.clone(), repo.clone(), hub.clone()),
        notifications: NotificationService::new(repo.clone(), repo.clone(), hub.clone()),
        support: SupportService::new(repo.clone(), repo.clone(), hub.clone()),
        directory: DirectoryService::new(repo.clone()),
        site: SiteService::new(repo),
        hub,
        identity,
    };

    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("binding {}", settings.server.bind))?;
    tracing::info!(addr = %settings.server.bind, "gram-bazaar listening");

    axum::serve(listener, web::router(state))
        .await
        .context("server exited")?;
    Ok(())
}
