//! Platform management. Listing and slug lookup are public; the rest is admin-only.

use serde::de::IgnoredAny;
use std::sync::Arc;

use super::api_client::{ApiClient, FileUpload};
use super::user_service::UploadedFile;
use super::{segment, with_query, BulkIds, ListQuery, RequestContext, ServiceResult};
use crate::models::page::Paginated;
use crate::models::platform::{Platform, PlatformInput};

pub struct PlatformService {
    client: Arc<ApiClient>,
}

impl PlatformService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// All platforms, as shown on the public site
    pub async fn list(&self, ctx: &RequestContext) -> ServiceResult<Vec<Platform>> {
        self.client.get(ctx, "/platforms", true).await
    }

    /// Paginated admin listing
    pub async fn list_paged(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> ServiceResult<Paginated<Platform>> {
        self.client
            .get(ctx, &with_query("/platforms/admin", query), false)
            .await
    }

    /// Only the platforms currently accepting downloads
    pub async fn list_active(&self, ctx: &RequestContext) -> ServiceResult<Vec<Platform>> {
        Ok(self
            .list(ctx)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .collect())
    }

    pub async fn get_by_slug(&self, ctx: &RequestContext, slug: &str) -> ServiceResult<Platform> {
        self.client
            .get(ctx, &format!("/platforms/slug/{}", segment(slug)), true)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> ServiceResult<Platform> {
        self.client
            .get(ctx, &format!("/platforms/{}", segment(id)), false)
            .await
    }

    pub async fn create(&self, ctx: &RequestContext, input: &PlatformInput) -> ServiceResult<Platform> {
        self.client.post(ctx, "/platforms", input, false).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: &PlatformInput,
    ) -> ServiceResult<Platform> {
        self.client
            .put(ctx, &format!("/platforms/{}", segment(id)), input)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> ServiceResult<()> {
        self.client
            .delete::<IgnoredAny>(ctx, &format!("/platforms/{}", segment(id)))
            .await
            .map(|_| ())
    }

    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &[String]) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/platforms/bulk-delete", &BulkIds { ids }, false)
            .await
            .map(|_| ())
    }

    /// Upload a platform thumbnail; returns its stored URL
    pub async fn upload_thumbnail(
        &self,
        ctx: &RequestContext,
        id: &str,
        file: FileUpload,
    ) -> ServiceResult<String> {
        let uploaded: UploadedFile = self
            .client
            .upload(
                ctx,
                &format!("/platforms/{}/thumbnail", segment(id)),
                "thumbnail",
                file,
            )
            .await?;
        Ok(uploaded.url)
    }
}
