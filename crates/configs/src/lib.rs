//! gram-bazaar/crates/configs/src/lib.rs
//!
//! Layered settings: compiled defaults, then an optional `config/*.toml`
//! file, then `GB__*` environment variables (e.g. `GB__SERVER__BIND`).
//! Call [`load_dotenv`] before [`Settings::load`] so a local `.env` file
//! participates in the environment layer.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Socket address the HTTP listener binds, e.g. "127.0.0.1:8080".
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite URL, e.g. "sqlite:gram_bazaar.db".
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 secret shared with the identity provider.
    pub jwt_secret: SecretString,
    /// Token lifetime for dev-issued tokens, in hours.
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Filesystem root for uploaded photos.
    pub root: String,
    /// Public URL prefix the stored photos are served under.
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
}

impl Settings {
    pub fn load() -> Result<Settings, SettingsError> {
        let config = Config::builder()
            .set_default("server.bind", "127.0.0.1:8080")?
            .set_default("database.url", "sqlite:gram_bazaar.db")?
            .set_default("auth.jwt_secret", "dev-secret-change-me")?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("media.root", "./data/uploads")?
            .set_default("media.url_prefix", "/media")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GB")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(bind = %settings.server.bind, "settings loaded");
        Ok(settings)
    }
}

/// Loads `.env` if present; missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
