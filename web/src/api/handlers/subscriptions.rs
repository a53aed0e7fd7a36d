//! Subscription administration (read and delete only).

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};

use super::{bulk_delete, delete_one};
use crate::api::dto::PaginationQuery;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::page::Paginated;
use crate::models::subscription::Subscription;
use crate::services::RequestContext;

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route("/admin/subscriptions", get(list_subscriptions))
        .route("/admin/subscriptions/:id", get(get_subscription))
        .route("/subscription/bulk", post(bulk_delete_subscriptions))
        .route("/subscription/:id", delete(delete_subscription))
}

pub async fn list_subscriptions(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Paginated<Subscription>>> {
    Ok(Json(
        state
            .subscriptions
            .list(&ctx, &query.to_list_query())
            .await?,
    ))
}

pub async fn get_subscription(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<Subscription>> {
    Ok(Json(state.subscriptions.get(&ctx, &id).await?))
}

pub async fn delete_subscription(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response {
    delete_one("Subscription", state.subscriptions.delete(&ctx, &id)).await
}

pub async fn bulk_delete_subscriptions(
    State(state): State<SharedState>,
    ctx: RequestContext,
    body: Bytes,
) -> Response {
    bulk_delete(&body, "subscription", |ids| async move {
        state.subscriptions.bulk_delete(&ctx, &ids).await
    })
    .await
}
