use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The promotional banner shown on the landing page. Admin-togglable;
/// consumers must revert optimistic toggles if the write fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementConfig {
    pub image_url: Option<String>,
    pub enabled: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Payment details shown to users for listing fees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub upi_id: Option<String>,
    pub qr_code_url: Option<String>,
}
