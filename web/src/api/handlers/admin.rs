//! Admin dashboard.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::or_fallback;
use crate::api::SharedState;
use crate::models::download::DownloadTask;
use crate::models::page::Paginated;
use crate::models::server::ServerHealth;
use crate::services::{ListQuery, RequestContext};

const RECENT_DOWNLOADS: u32 = 10;

pub fn router() -> Router<SharedState> {
    Router::new().route("/admin", get(dashboard))
}

#[derive(Debug, Default, Serialize)]
pub struct DashboardTotals {
    pub users: i64,
    pub platforms: i64,
    pub downloads: i64,
    pub subscriptions: i64,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub health: ServerHealth,
    pub totals: DashboardTotals,
    pub recent_downloads: Vec<DownloadTask>,
}

fn total<T>(page: Paginated<T>) -> i64 {
    page.pagination.total.max(page.items.len() as i64)
}

/// Counters and health; every panel degrades on its own.
pub async fn dashboard(State(state): State<SharedState>, ctx: RequestContext) -> Json<Dashboard> {
    let one = ListQuery::first_page(1);
    let recent = ListQuery::first_page(RECENT_DOWNLOADS);

    let (health, users, platforms, downloads, subscriptions) = tokio::join!(
        state.server_status.health(&ctx),
        state.users.list(&ctx, &one),
        state.platforms.list_paged(&ctx, &one),
        state.downloads.list(&ctx, &recent),
        state.subscriptions.list(&ctx, &one),
    );

    let downloads = or_fallback(downloads, "recent downloads", Paginated::empty());
    let totals = DashboardTotals {
        users: total(or_fallback(users, "user count", Paginated::empty())),
        platforms: total(or_fallback(platforms, "platform count", Paginated::empty())),
        downloads: downloads.pagination.total.max(downloads.items.len() as i64),
        subscriptions: total(or_fallback(subscriptions, "subscription count", Paginated::empty())),
    };

    Json(Dashboard {
        health: or_fallback(health, "server health", ServerHealth::unavailable()),
        totals,
        recent_downloads: downloads.items,
    })
}
