//! User administration.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Extension, Json, Router,
};

use super::{bulk_delete, delete_one, see_other, ActionResult};
use crate::api::dto::PaginationQuery;
use crate::api::forms::{FormBody, UserForm, Validate};
use crate::api::middleware::auth::CurrentUser;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::page::Paginated;
use crate::models::user::{Role, User};
use crate::services::RequestContext;

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/:id", get(get_user).post(update_user))
        .route("/user/bulk", post(bulk_delete_users))
        .route("/user/:id", delete(delete_user))
}

pub async fn list_users(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Paginated<User>>> {
    Ok(Json(state.users.list(&ctx, &query.to_list_query()).await?))
}

pub async fn get_user(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get(&ctx, &id).await?))
}

pub async fn create_user(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<UserForm>,
) -> ActionResult {
    form.check_with(|errors| form.require_password(errors))?;
    let user = state.users.create(&ctx, &form.to_input()).await?;
    tracing::info!(user_id = %user.id, "User created by admin");
    see_other(&format!("/admin/users/{}", user.id))
}

pub async fn update_user(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(id): Path<String>,
    FormBody(form): FormBody<UserForm>,
) -> ActionResult {
    form.check()?;
    let input = form.to_input();
    if admin.id == id && !(input.is_active && input.role == Role::Admin) {
        return Err(AppError::Validation(
            "You cannot deactivate or demote your own account".to_string(),
        )
        .into());
    }
    state.users.update(&ctx, &id, &input).await?;
    see_other(&format!("/admin/users/{}", id))
}

pub async fn delete_user(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    if admin.id == id {
        return AppError::Validation("You cannot delete your own account".to_string())
            .into_response();
    }
    delete_one("User", state.users.delete(&ctx, &id)).await
}

pub async fn bulk_delete_users(
    State(state): State<SharedState>,
    ctx: RequestContext,
    body: Bytes,
) -> Response {
    bulk_delete(&body, "user", |ids| async move {
        state.users.bulk_delete(&ctx, &ids).await
    })
    .await
}
