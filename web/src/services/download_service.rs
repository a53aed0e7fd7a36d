//! Download task submission and lookup. The backend owns task state.

use serde::de::IgnoredAny;
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{segment, with_query, BulkIds, ListQuery, RequestContext, ServiceResult};
use crate::models::download::{DownloadRequest, DownloadTask};
use crate::models::page::Paginated;

pub struct DownloadService {
    client: Arc<ApiClient>,
}

impl DownloadService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Submit a URL; anonymous users are allowed
    pub async fn create(&self, ctx: &RequestContext, request: &DownloadRequest) -> ServiceResult<DownloadTask> {
        self.client.post(ctx, "/downloads", request, true).await
    }

    /// Poll a task's state
    pub async fn get(&self, ctx: &RequestContext, id: &str) -> ServiceResult<DownloadTask> {
        self.client
            .get(ctx, &format!("/downloads/{}", segment(id)), true)
            .await
    }

    /// All tasks (admin)
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> ServiceResult<Paginated<DownloadTask>> {
        self.client
            .get(ctx, &with_query("/downloads", query), false)
            .await
    }

    /// The signed-in user's own tasks
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> ServiceResult<Paginated<DownloadTask>> {
        self.client
            .get(ctx, &with_query("/downloads/me", query), false)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> ServiceResult<()> {
        self.client
            .delete::<IgnoredAny>(ctx, &format!("/downloads/{}", segment(id)))
            .await
            .map(|_| ())
    }

    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &[String]) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/downloads/bulk-delete", &BulkIds { ids }, false)
            .await
            .map(|_| ())
    }
}
