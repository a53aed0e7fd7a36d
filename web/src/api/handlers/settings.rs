//! Site settings administration, one form per group.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{see_other, uploads, ActionResult};
use crate::api::dto::UploadResponse;
use crate::api::forms::{
    EmailSettingsForm, FormBody, MonetizationSettingsForm, SystemSettingsForm, Validate,
    WebsiteSettingsForm,
};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::settings::{Settings, SettingsGroup};
use crate::services::seo_service::Artifact;
use crate::services::RequestContext;

const SETTINGS_PAGE: &str = "/admin/settings";

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route(SETTINGS_PAGE, get(settings_page))
        .route("/admin/settings/website", post(update_website))
        .route("/admin/settings/email", post(update_email))
        .route("/admin/settings/system", post(update_system))
        .route("/admin/settings/monetization", post(update_monetization))
        .route("/admin/settings/logo", post(upload_logo))
}

#[derive(Debug, Serialize)]
pub struct SettingsPage {
    #[serde(flatten)]
    pub settings: Settings,
    /// The SMTP password itself is never sent to the browser
    pub smtp_password_set: bool,
}

pub async fn settings_page(
    State(state): State<SharedState>,
    ctx: RequestContext,
) -> Result<Json<SettingsPage>> {
    let mut settings = state.settings.get_all(&ctx).await?;
    let smtp_password_set = !settings.email.smtp_password.is_empty();
    settings.email.smtp_password.clear();
    Ok(Json(SettingsPage {
        settings,
        smtp_password_set,
    }))
}

pub async fn update_website(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<WebsiteSettingsForm>,
) -> ActionResult {
    form.check()?;
    state
        .settings
        .update_group(&ctx, SettingsGroup::Website, &form.to_update())
        .await?;
    // Feeds carry the site name
    state.seo.invalidate(&state.seo.listing_artifacts()).await;
    see_other(SETTINGS_PAGE)
}

pub async fn update_email(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<EmailSettingsForm>,
) -> ActionResult {
    form.check()?;
    state
        .settings
        .update_group(&ctx, SettingsGroup::Email, &form.to_update())
        .await?;
    see_other(SETTINGS_PAGE)
}

pub async fn update_system(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<SystemSettingsForm>,
) -> ActionResult {
    form.check()?;
    let system = form.to_settings();
    state
        .settings
        .update_group(&ctx, SettingsGroup::System, &system)
        .await?;
    if system.maintenance_mode {
        tracing::warn!("Maintenance mode enabled");
    }
    see_other(SETTINGS_PAGE)
}

pub async fn update_monetization(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<MonetizationSettingsForm>,
) -> ActionResult {
    form.check()?;
    state
        .settings
        .update_group(&ctx, SettingsGroup::Monetization, &form.to_settings())
        .await?;
    state.seo.invalidate(&[Artifact::AdsTxt]).await;
    see_other(SETTINGS_PAGE)
}

pub async fn upload_logo(
    State(state): State<SharedState>,
    ctx: RequestContext,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let file = uploads::read_image(multipart).await?;
    let url = state.settings.upload_logo(&ctx, file).await?;
    Ok(Json(UploadResponse { success: true, url }).into_response())
}
