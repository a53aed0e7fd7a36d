//! The signed-in user's account page and its actions.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;

use super::{or_fallback, see_other, uploads, ActionResult};
use crate::api::dto::UploadResponse;
use crate::api::forms::{FormBody, PasswordForm, ProfileForm, Validate};
use crate::api::middleware::auth::CurrentUser;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::download::DownloadTask;
use crate::models::page::Paginated;
use crate::models::user::User;
use crate::services::{ListQuery, RequestContext};

/// Downloads shown on the account page
const RECENT_DOWNLOADS: u32 = 20;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/account", get(account_page))
        .route("/account/profile", post(update_profile))
        .route("/account/password", post(update_password))
        .route("/account/avatar", post(upload_avatar))
}

#[derive(Debug, Serialize)]
pub struct AccountPage {
    pub user: User,
    pub downloads: Paginated<DownloadTask>,
}

pub async fn account_page(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<AccountPage> {
    let downloads = or_fallback(
        state
            .downloads
            .list_mine(&ctx, &ListQuery::first_page(RECENT_DOWNLOADS))
            .await,
        "account downloads",
        Paginated::empty(),
    );
    Json(AccountPage { user, downloads })
}

pub async fn update_profile(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<ProfileForm>,
) -> ActionResult {
    form.check()?;
    state.users.update_profile(&ctx, &form.to_input()).await?;
    see_other("/account")
}

pub async fn update_password(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    FormBody(form): FormBody<PasswordForm>,
) -> ActionResult {
    form.check()?;
    state
        .auth
        .update_password(&ctx, &form.current_password, &form.new_password)
        .await?;
    tracing::info!(user_id = %user.id, "Password changed");
    see_other("/account")
}

pub async fn upload_avatar(
    State(state): State<SharedState>,
    ctx: RequestContext,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let file = uploads::read_image(multipart).await?;
    let url = state.users.upload_avatar(&ctx, file).await?;
    Ok(Json(UploadResponse { success: true, url }).into_response())
}
