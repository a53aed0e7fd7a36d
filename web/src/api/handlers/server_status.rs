//! Backend server health and logs for the admin area.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::or_fallback;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::server::{LogEntry, ServerHealth};
use crate::services::server_status_service::LogQuery;
use crate::services::RequestContext;

const DEFAULT_LOG_LIMIT: u32 = 100;
const MAX_LOG_LIMIT: u32 = 1000;
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug"];

pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route("/admin/server", get(server_page))
        .route("/admin/server/logs", get(server_logs))
}

#[derive(Debug, Serialize)]
pub struct ServerPage {
    pub health: ServerHealth,
    pub web_version: &'static str,
}

pub async fn server_page(State(state): State<SharedState>, ctx: RequestContext) -> Json<ServerPage> {
    let health = or_fallback(
        state.server_status.health(&ctx).await,
        "server health",
        ServerHealth::unavailable(),
    );
    Json(ServerPage {
        health,
        web_version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct LogFilter {
    pub level: Option<String>,
    pub limit: Option<String>,
}

impl LogFilter {
    fn to_query(&self) -> LogQuery {
        LogQuery {
            level: self
                .level
                .as_deref()
                .map(|l| l.trim().to_ascii_lowercase())
                .filter(|l| LOG_LEVELS.contains(&l.as_str())),
            limit: Some(
                self.limit
                    .as_deref()
                    .and_then(|l| l.trim().parse::<u32>().ok())
                    .map(|l| l.clamp(1, MAX_LOG_LIMIT))
                    .unwrap_or(DEFAULT_LOG_LIMIT),
            ),
        }
    }
}

pub async fn server_logs(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Query(filter): Query<LogFilter>,
) -> Result<Json<Vec<LogEntry>>> {
    Ok(Json(state.server_status.logs(&ctx, &filter.to_query()).await?))
}
