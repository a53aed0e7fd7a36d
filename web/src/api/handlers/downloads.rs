//! Download submission, status polling, and download administration.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use super::{bulk_delete, delete_one, ActionError, ActionResult};
use crate::api::dto::{ApiResponse, BulkIdsRequest, PaginationQuery};
use crate::api::forms::{DownloadForm, FormBody, Validate};
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::download::{DownloadRequest, DownloadTask};
use crate::models::page::Paginated;
use crate::services::RequestContext;

#[derive(OpenApi)]
#[openapi(
    paths(create_download, get_download, delete_download, bulk_delete_downloads),
    components(schemas(DownloadSubmitted, DownloadTask, DownloadRequest, ApiResponse, BulkIdsRequest))
)]
pub struct DownloadsApiDoc;

/// Anonymous visitors may submit and poll downloads.
pub fn public_router() -> Router<SharedState> {
    Router::new()
        .route("/download", post(submit_download_form))
        .route("/api/downloads", post(create_download))
        .route("/api/downloads/:id", get(get_download))
}

pub fn user_router() -> Router<SharedState> {
    Router::new().route("/download/:id", delete(delete_download))
}

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route("/admin/downloads", get(list_downloads))
        .route("/admin/downloads/:id", get(get_download_admin))
        .route("/download/bulk", post(bulk_delete_downloads))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadSubmitted {
    pub success: bool,
    pub message: String,
    pub task: DownloadTask,
}

async fn submit(state: &SharedState, ctx: &RequestContext, form: DownloadForm) -> ActionResult {
    form.check()?;
    let task = state.downloads.create(ctx, &form.to_request()).await?;
    tracing::info!(task_id = %task.id, download_type = ?task.download_type, "Download submitted");
    Ok(Json(DownloadSubmitted {
        success: true,
        message: "Download started".to_string(),
        task,
    })
    .into_response())
}

pub async fn submit_download_form(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<DownloadForm>,
) -> ActionResult {
    submit(&state, &ctx, form).await
}

/// Submit a URL for download
#[utoipa::path(
    post,
    path = "/api/downloads",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Download task created", body = DownloadSubmitted),
        (status = 400, description = "Invalid URL or backend rejected it", body = ApiResponse),
    )
)]
pub async fn create_download(
    State(state): State<SharedState>,
    ctx: RequestContext,
    body: Bytes,
) -> ActionResult {
    let form: DownloadForm =
        serde_json::from_slice(&body).map_err(|e| ActionError::App(AppError::Json(e)))?;
    submit(&state, &ctx, form).await
}

/// Poll the state of a download task
#[utoipa::path(
    get,
    path = "/api/downloads/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Download task id")),
    responses(
        (status = 200, description = "Current task state", body = DownloadTask),
        (status = 404, description = "Unknown task", body = ApiResponse),
    )
)]
pub async fn get_download(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<DownloadTask>> {
    match state.downloads.get(&ctx, &id).await {
        Ok(task) => Ok(Json(task)),
        Err(e) if e.is_not_found() => Err(AppError::NotFound(format!("Download {}", id))),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_downloads(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Paginated<DownloadTask>>> {
    Ok(Json(
        state.downloads.list(&ctx, &query.to_list_query()).await?,
    ))
}

pub async fn get_download_admin(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<DownloadTask>> {
    Ok(Json(state.downloads.get(&ctx, &id).await?))
}

/// Delete a download
#[utoipa::path(
    delete,
    path = "/download/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Download task id")),
    responses(
        (status = 200, description = "Download deleted", body = ApiResponse),
        (status = 400, description = "Backend rejected the delete", body = ApiResponse),
    )
)]
pub async fn delete_download(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    delete_one("Download", state.downloads.delete(&ctx, &id)).await
}

#[utoipa::path(
    post,
    path = "/download/bulk",
    tag = "downloads",
    request_body = BulkIdsRequest,
    responses(
        (status = 200, description = "Downloads deleted", body = ApiResponse),
        (status = 400, description = "No ids provided or backend rejected the delete", body = ApiResponse),
    )
)]
pub async fn bulk_delete_downloads(
    State(state): State<SharedState>,
    ctx: RequestContext,
    body: Bytes,
) -> Response {
    bulk_delete(&body, "download", |ids| async move {
        state.downloads.bulk_delete(&ctx, &ids).await
    })
    .await
}
