//! Registered application management (admin-only).

use serde::{de::IgnoredAny, Serialize};
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{segment, with_query, BulkIds, ListQuery, RequestContext, ServiceResult};
use crate::models::application::{Application, ApplicationInput};
use crate::models::page::Paginated;

#[derive(Serialize)]
struct ApplicationQuery<'a> {
    #[serde(flatten)]
    list: &'a ListQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform_id: Option<&'a str>,
}

pub struct ApplicationService {
    client: Arc<ApiClient>,
}

impl ApplicationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List applications, optionally restricted to one platform
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
        platform_id: Option<&str>,
    ) -> ServiceResult<Paginated<Application>> {
        let query = ApplicationQuery {
            list: query,
            platform_id,
        };
        self.client
            .get(ctx, &with_query("/applications", &query), false)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> ServiceResult<Application> {
        self.client
            .get(ctx, &format!("/applications/{}", segment(id)), false)
            .await
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: &ApplicationInput,
    ) -> ServiceResult<Application> {
        self.client.post(ctx, "/applications", input, false).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        input: &ApplicationInput,
    ) -> ServiceResult<Application> {
        self.client
            .put(ctx, &format!("/applications/{}", segment(id)), input)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> ServiceResult<()> {
        self.client
            .delete::<IgnoredAny>(ctx, &format!("/applications/{}", segment(id)))
            .await
            .map(|_| ())
    }

    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &[String]) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/applications/bulk-delete", &BulkIds { ids }, false)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_flattens_list_fields() {
        let list = ListQuery::first_page(10);
        let query = ApplicationQuery {
            list: &list,
            platform_id: Some("p1"),
        };
        assert_eq!(
            with_query("/applications", &query),
            "/applications?page=1&per_page=10&platform_id=p1"
        );
    }
}
