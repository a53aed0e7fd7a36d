//! Platform administration.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::OpenApi;

use super::{bulk_delete, delete_one, or_fallback, see_other, uploads, ActionResult};
use crate::api::dto::{ApiResponse, BulkIdsRequest, PaginationQuery, UploadResponse};
use crate::api::forms::{FormBody, PlatformForm, Validate};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::application::Application;
use crate::models::page::Paginated;
use crate::models::platform::Platform;
use crate::services::{ListQuery, RequestContext};

/// Applications listed on a platform's detail page
const PLATFORM_APPLICATIONS: u32 = 100;

#[derive(OpenApi)]
#[openapi(
    paths(delete_platform, bulk_delete_platforms),
    components(schemas(ApiResponse, BulkIdsRequest))
)]
pub struct PlatformsApiDoc;

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route("/admin/platforms", get(list_platforms).post(create_platform))
        .route("/admin/platforms/:id", get(get_platform).post(update_platform))
        .route("/admin/platforms/:id/thumbnail", post(upload_thumbnail))
        .route("/platform/bulk", post(bulk_delete_platforms))
        .route("/platform/:id", delete(delete_platform))
}

pub async fn list_platforms(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Paginated<Platform>>> {
    Ok(Json(
        state
            .platforms
            .list_paged(&ctx, &query.to_list_query())
            .await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct PlatformDetail {
    pub platform: Platform,
    pub applications: Vec<Application>,
}

/// A platform with its applications; the application list is optional.
pub async fn get_platform(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<PlatformDetail>> {
    let platform = state.platforms.get(&ctx, &id).await?;
    let applications = or_fallback(
        state
            .applications
            .list(&ctx, &ListQuery::first_page(PLATFORM_APPLICATIONS), Some(&platform.id))
            .await
            .map(|page| page.items),
        "platform applications",
        Vec::new(),
    );
    Ok(Json(PlatformDetail {
        platform,
        applications,
    }))
}

pub async fn create_platform(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<PlatformForm>,
) -> ActionResult {
    form.check()?;
    let platform = state.platforms.create(&ctx, &form.to_input()).await?;
    tracing::info!(platform_id = %platform.id, slug = %platform.slug, "Platform created");
    refresh_listings(&state).await;
    see_other(&format!("/admin/platforms/{}", platform.id))
}

pub async fn update_platform(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    FormBody(form): FormBody<PlatformForm>,
) -> ActionResult {
    form.check()?;
    state.platforms.update(&ctx, &id, &form.to_input()).await?;
    refresh_listings(&state).await;
    see_other(&format!("/admin/platforms/{}", id))
}

pub async fn upload_thumbnail(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let file = uploads::read_image(multipart).await?;
    let url = state.platforms.upload_thumbnail(&ctx, &id, file).await?;
    Ok(Json(UploadResponse { success: true, url }).into_response())
}

#[utoipa::path(
    delete,
    path = "/platform/{id}",
    tag = "platforms",
    params(("id" = String, Path, description = "Platform id")),
    responses(
        (status = 200, description = "Platform deleted", body = ApiResponse),
        (status = 400, description = "Backend rejected the delete", body = ApiResponse),
    )
)]
pub async fn delete_platform(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    let response = delete_one("Platform", state.platforms.delete(&ctx, &id)).await;
    if response.status().is_success() {
        refresh_listings(&state).await;
    }
    response
}

#[utoipa::path(
    post,
    path = "/platform/bulk",
    tag = "platforms",
    request_body = BulkIdsRequest,
    responses(
        (status = 200, description = "Platforms deleted", body = ApiResponse),
        (status = 400, description = "No ids provided or backend rejected the delete", body = ApiResponse),
    )
)]
pub async fn bulk_delete_platforms(
    State(state): State<SharedState>,
    ctx: RequestContext,
    body: Bytes,
) -> Response {
    let platforms = state.platforms.clone();
    let response = bulk_delete(&body, "platform", |ids| async move {
        platforms.bulk_delete(&ctx, &ids).await
    })
    .await;
    if response.status().is_success() {
        refresh_listings(&state).await;
    }
    response
}

/// Sitemaps and feeds list the active platforms.
async fn refresh_listings(state: &SharedState) {
    state.seo.invalidate(&state.seo.listing_artifacts()).await;
}
