//! User administration and profile operations.

use serde::{de::IgnoredAny, Deserialize, Serialize};
use std::sync::Arc;

use super::api_client::{ApiClient, FileUpload};
use super::{segment, with_query, BulkIds, ListQuery, RequestContext, ServiceResult};
use crate::models::page::Paginated;
use crate::models::user::{Role, User};

/// Payload for admin-side user create/update
#[derive(Debug, Clone, Serialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Payload for the signed-in user's own profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}

pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, ctx: &RequestContext, query: &ListQuery) -> ServiceResult<Paginated<User>> {
        self.client.get(ctx, &with_query("/users", query), false).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> ServiceResult<User> {
        self.client
            .get(ctx, &format!("/users/{}", segment(id)), false)
            .await
    }

    pub async fn create(&self, ctx: &RequestContext, input: &UserInput) -> ServiceResult<User> {
        self.client.post(ctx, "/users", input, false).await
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, input: &UserInput) -> ServiceResult<User> {
        self.client
            .put(ctx, &format!("/users/{}", segment(id)), input)
            .await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> ServiceResult<()> {
        self.client
            .delete::<IgnoredAny>(ctx, &format!("/users/{}", segment(id)))
            .await
            .map(|_| ())
    }

    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &[String]) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/users/bulk-delete", &BulkIds { ids }, false)
            .await
            .map(|_| ())
    }

    pub async fn update_profile(&self, ctx: &RequestContext, input: &ProfileInput) -> ServiceResult<User> {
        self.client.put(ctx, "/users/profile", input).await
    }

    /// Upload a new avatar; returns its stored URL
    pub async fn upload_avatar(&self, ctx: &RequestContext, file: FileUpload) -> ServiceResult<String> {
        let uploaded: UploadedFile = self.client.upload(ctx, "/users/avatar", "avatar", file).await?;
        Ok(uploaded.url)
    }
}
