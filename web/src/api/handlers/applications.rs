//! Application (mobile app ad configuration) administration.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{bulk_delete, delete_one, or_fallback, see_other, ActionResult};
use crate::api::dto::PaginationQuery;
use crate::api::forms::{optional, ApplicationForm, FormBody, Validate};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::application::Application;
use crate::models::page::Paginated;
use crate::models::platform::Platform;
use crate::services::RequestContext;

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/admin/applications/:id",
            get(get_application).post(update_application),
        )
        .route("/application/bulk", post(bulk_delete_applications))
        .route("/application/:id", delete(delete_application))
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub platform_id: Option<String>,
}

pub async fn list_applications(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<Paginated<Application>>> {
    let platform_id = optional(&query.platform_id);
    Ok(Json(
        state
            .applications
            .list(&ctx, &query.pagination.to_list_query(), platform_id.as_deref())
            .await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct ApplicationDetail {
    pub application: Application,
    /// Choices for the platform selector
    pub platforms: Vec<Platform>,
}

pub async fn get_application(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<ApplicationDetail>> {
    let (application, platforms) = tokio::join!(
        state.applications.get(&ctx, &id),
        state.platforms.list(&ctx)
    );
    Ok(Json(ApplicationDetail {
        application: application?,
        platforms: or_fallback(platforms, "platform choices", Vec::new()),
    }))
}

pub async fn create_application(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<ApplicationForm>,
) -> ActionResult {
    form.check()?;
    let application = state.applications.create(&ctx, &form.to_input()).await?;
    tracing::info!(application_id = %application.id, "Application created");
    see_other(&format!("/admin/applications/{}", application.id))
}

pub async fn update_application(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    FormBody(form): FormBody<ApplicationForm>,
) -> ActionResult {
    form.check()?;
    state.applications.update(&ctx, &id, &form.to_input()).await?;
    see_other(&format!("/admin/applications/{}", id))
}

pub async fn delete_application(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    delete_one("Application", state.applications.delete(&ctx, &id)).await
}

pub async fn bulk_delete_applications(
    State(state): State<SharedState>,
    ctx: RequestContext,
    body: Bytes,
) -> Response {
    bulk_delete(&body, "application", |ids| async move {
        state.applications.bulk_delete(&ctx, &ids).await
    })
    .await
}
