//! Backend health metrics and log retrieval.

use serde::Serialize;
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{with_query, RequestContext, ServiceResult};
use crate::models::server::{LogEntry, ServerHealth};

/// Filter for the log endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

pub struct ServerStatusService {
    client: Arc<ApiClient>,
}

impl ServerStatusService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn health(&self, ctx: &RequestContext) -> ServiceResult<ServerHealth> {
        self.client.get(ctx, "/server/health", false).await
    }

    pub async fn logs(&self, ctx: &RequestContext, query: &LogQuery) -> ServiceResult<Vec<LogEntry>> {
        self.client
            .get(ctx, &with_query("/server/logs", query), false)
            .await
    }
}
