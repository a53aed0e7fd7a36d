//! Application model: a registered downstream app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Application record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub package_name: String,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub banner_ad_unit_id: Option<String>,
    #[serde(default)]
    pub interstitial_ad_unit_id: Option<String>,
    #[serde(default)]
    pub rewarded_ad_unit_id: Option<String>,
    #[serde(default)]
    pub ads_enabled: bool,
    #[serde(default)]
    pub is_premium_only: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating an application
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationInput {
    pub name: String,
    pub package_name: String,
    pub platform_id: Option<String>,
    pub banner_ad_unit_id: Option<String>,
    pub interstitial_ad_unit_id: Option<String>,
    pub rewarded_ad_unit_id: Option<String>,
    pub ads_enabled: bool,
    pub is_premium_only: bool,
}
