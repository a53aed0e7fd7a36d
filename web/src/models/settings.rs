//! Grouped site settings.
//!
//! The backend stores settings as flat `{group, key, value}` rows. Each group
//! has a typed struct here whose `Default` supplies the values used when the
//! backend has nothing stored for a key.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Settings group identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SettingsGroup {
    Website,
    Email,
    System,
    Monetization,
}

impl SettingsGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsGroup::Website => "website",
            SettingsGroup::Email => "email",
            SettingsGroup::System => "system",
            SettingsGroup::Monetization => "monetization",
        }
    }
}

impl std::fmt::Display for SettingsGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored setting row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingItem {
    pub group: SettingsGroup,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WebsiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub contact_email: Option<String>,
    pub default_language: String,
}

impl Default for WebsiteSettings {
    fn default() -> Self {
        Self {
            site_name: "VidGrab".to_string(),
            site_description: "Download videos from your favourite platforms".to_string(),
            logo: None,
            favicon: None,
            contact_email: None,
            default_language: "en".to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub encryption: String,
    pub from_email: String,
    pub from_name: String,
}

redacted_debug!(EmailSettings {
    show smtp_host,
    show smtp_port,
    show smtp_username,
    redact smtp_password,
    show encryption,
    show from_email,
    show from_name,
});

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            encryption: "tls".to_string(),
            from_email: String::new(),
            from_name: "VidGrab".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SystemSettings {
    pub maintenance_mode: bool,
    pub registration_enabled: bool,
    pub max_downloads_per_day: u32,
    pub max_file_size_mb: u32,
    pub download_expiry_hours: u32,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            maintenance_mode: false,
            registration_enabled: true,
            max_downloads_per_day: 10,
            max_file_size_mb: 500,
            download_expiry_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MonetizationSettings {
    pub ads_enabled: bool,
    pub adsense_publisher_id: Option<String>,
    pub header_ad_slot: Option<String>,
    pub sidebar_ad_slot: Option<String>,
    pub premium_enabled: bool,
}

/// All settings groups, with defaults filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Settings {
    pub website: WebsiteSettings,
    pub email: EmailSettings,
    pub system: SystemSettings,
    pub monetization: MonetizationSettings,
}

impl Settings {
    /// Build typed settings from stored rows. Keys missing from `items` keep
    /// their default value; rows of an unexpected shape are ignored.
    pub fn from_items(items: &[SettingItem]) -> Self {
        Self {
            website: group_from_items(SettingsGroup::Website, items),
            email: group_from_items(SettingsGroup::Email, items),
            system: group_from_items(SettingsGroup::System, items),
            monetization: group_from_items(SettingsGroup::Monetization, items),
        }
    }
}

fn group_from_items<T>(group: SettingsGroup, items: &[SettingItem]) -> T
where
    T: Default + Serialize + DeserializeOwned,
{
    let defaults = T::default();
    let mut map = match serde_json::to_value(&defaults) {
        Ok(Value::Object(map)) => map,
        _ => return defaults,
    };

    for item in items.iter().filter(|i| i.group == group) {
        if map.contains_key(&item.key) {
            map.insert(item.key.clone(), item.value.clone());
        }
    }

    serde_json::from_value(Value::Object(map)).unwrap_or_else(|e| {
        tracing::warn!(group = %group, "Stored settings do not match schema, using defaults: {}", e);
        T::default()
    })
}

/// Flatten a typed group back into rows for the bulk update call.
pub fn group_to_items<T: Serialize>(group: SettingsGroup, settings: &T) -> Vec<SettingItem> {
    match serde_json::to_value(settings) {
        Ok(Value::Object(map)) => map_to_items(group, map),
        _ => Vec::new(),
    }
}

fn map_to_items(group: SettingsGroup, map: Map<String, Value>) -> Vec<SettingItem> {
    map.into_iter()
        .map(|(key, value)| SettingItem { group, key, value })
        .collect()
}
