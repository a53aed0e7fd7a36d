//! Site settings: read with defaults, bulk update per group, logo upload.

use serde::{de::IgnoredAny, Serialize};
use std::sync::Arc;

use super::api_client::{ApiClient, FileUpload};
use super::user_service::UploadedFile;
use super::{RequestContext, ServiceResult};
use crate::models::settings::{group_to_items, SettingItem, Settings, SettingsGroup};

#[derive(Serialize)]
struct BulkSettings<'a> {
    settings: &'a [SettingItem],
}

pub struct SettingsService {
    client: Arc<ApiClient>,
}

impl SettingsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// All groups; anything the backend does not return keeps its default.
    pub async fn get_all(&self, ctx: &RequestContext) -> ServiceResult<Settings> {
        let items: Option<Vec<SettingItem>> = self.client.get(ctx, "/settings", true).await?;
        Ok(Settings::from_items(&items.unwrap_or_default()))
    }

    /// Replace every key of one group in a single call
    pub async fn update_group<T: Serialize>(
        &self,
        ctx: &RequestContext,
        group: SettingsGroup,
        values: &T,
    ) -> ServiceResult<()> {
        let items = group_to_items(group, values);
        tracing::debug!(group = %group, keys = items.len(), "Updating settings group");
        self.client
            .put::<IgnoredAny, _>(ctx, "/settings/bulk", &BulkSettings { settings: &items })
            .await
            .map(|_| ())
    }

    /// Upload the site logo; returns its stored URL
    pub async fn upload_logo(&self, ctx: &RequestContext, file: FileUpload) -> ServiceResult<String> {
        let uploaded: UploadedFile = self.client.upload(ctx, "/settings/logo", "logo", file).await?;
        Ok(uploaded.url)
    }
}
