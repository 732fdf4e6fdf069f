//! Site-config documents: the advertisement banner and payment details.

use std::sync::Arc;

use chrono::Utc;

use domains::{AdvertisementConfig, Caller, PaymentConfig, Result, SiteConfigRepo};

#[derive(Clone)]
pub struct SiteService {
    config: Arc<dyn SiteConfigRepo>,
}

impl SiteService {
    pub fn new(config: Arc<dyn SiteConfigRepo>) -> Self {
        Self { config }
    }

    pub async fn advertisement(&self) -> Result<AdvertisementConfig> {
        self.config.advertisement().await
    }

    pub async fn set_advertisement(
        &self,
        caller: Caller,
        mut config: AdvertisementConfig,
    ) -> Result<AdvertisementConfig> {
        caller.require_admin("config/advertisement", "update")?;
        config.last_updated = Some(Utc::now());
        self.config.set_advertisement(&config).await?;
        Ok(config)
    }

    pub async fn payment(&self) -> Result<PaymentConfig> {
        self.config.payment().await
    }

    pub async fn set_payment(&self, caller: Caller, config: PaymentConfig) -> Result<PaymentConfig> {
        caller.require_admin("config/payment", "update")?;
        self.config.set_payment(&config).await?;
        Ok(config)
    }
}
