//! Subscription records (admin view and deletion only).

use serde::de::IgnoredAny;
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{segment, with_query, BulkIds, ListQuery, RequestContext, ServiceResult};
use crate::models::page::Paginated;
use crate::models::subscription::Subscription;

pub struct SubscriptionService {
    client: Arc<ApiClient>,
}

impl SubscriptionService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> ServiceResult<Paginated<Subscription>> {
        self.client
            .get(ctx, &with_query("/subscriptions", query), false)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> ServiceResult<Subscription> {
        self.client
            .get(ctx, &format!("/subscriptions/{}", segment(id)), false)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> ServiceResult<()> {
        self.client
            .delete::<IgnoredAny>(ctx, &format!("/subscriptions/{}", segment(id)))
            .await
            .map(|_| ())
    }

    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &[String]) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/subscriptions/bulk-delete", &BulkIds { ids }, false)
            .await
            .map(|_| ())
    }
}
