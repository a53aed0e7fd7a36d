//! Platform model: a supported source site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of media a platform serves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    #[default]
    Video,
    Audio,
    Image,
    Mixed,
}

impl PlatformType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "image" => Some(Self::Image),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Platform record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type", default)]
    pub platform_type: PlatformType,
    #[serde(default)]
    pub url_pattern: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating a platform
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlatformInput {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub platform_type: PlatformType,
    pub url_pattern: Option<String>,
    pub is_active: bool,
    pub is_premium: bool,
    pub description: Option<String>,
}
