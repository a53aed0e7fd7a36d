//! Web-client telemetry: forwards browser error reports to the backend sink.

use serde::{de::IgnoredAny, Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::api_client::ApiClient;
use super::{RequestContext, ServiceResult};

/// Longest message/stack forwarded to the backend
const MAX_FIELD_LEN: usize = 8 * 1024;

/// An error captured in the browser
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientErrorReport {
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: Option<serde_json::Value>,
}

impl ClientErrorReport {
    /// Clip oversized fields before forwarding.
    pub fn truncated(mut self) -> Self {
        truncate(&mut self.message);
        if let Some(stack) = self.stack.as_mut() {
            truncate(stack);
        }
        self
    }
}

fn truncate(s: &mut String) {
    if s.len() > MAX_FIELD_LEN {
        let mut end = MAX_FIELD_LEN;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}

pub struct WebService {
    client: Arc<ApiClient>,
}

impl WebService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn report_error(&self, ctx: &RequestContext, report: ClientErrorReport) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/web-client/report/errors", &report.truncated(), true)
            .await
            .map(|_| ())
    }
}
