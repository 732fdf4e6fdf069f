use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::Row;

use domains::{AdvertisementConfig, PaymentConfig, Result, SiteConfigRepo};

use super::{db_err, SqliteStore};

const KEY_ADVERTISEMENT: &str = "advertisement";
const KEY_PAYMENT: &str = "payment";

impl SqliteStore {
    async fn config_document<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let row = sqlx::query("SELECT value FROM site_config WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(row) => {
                let value: String = row.try_get("value").map_err(db_err)?;
                serde_json::from_str(&value).map_err(db_err)
            }
            // Absent documents read as their defaults.
            None => Ok(T::default()),
        }
    }

    async fn put_config_document<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        sqlx::query(
            "INSERT INTO site_config (key, value, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(serde_json::to_string(value).map_err(db_err)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl SiteConfigRepo for SqliteStore {
    async fn advertisement(&self) -> Result<AdvertisementConfig> {
        self.config_document(KEY_ADVERTISEMENT).await
    }

    async fn set_advertisement(&self, config: &AdvertisementConfig) -> Result<()> {
        self.put_config_document(KEY_ADVERTISEMENT, config).await
    }

    async fn payment(&self) -> Result<PaymentConfig> {
        self.config_document(KEY_PAYMENT).await
    }

    async fn set_payment(&self, config: &PaymentConfig) -> Result<()> {
        self.put_config_document(KEY_PAYMENT, config).await
    }
}
