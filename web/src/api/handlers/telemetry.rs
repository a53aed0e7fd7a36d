//! Browser error reports.

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use utoipa::OpenApi;

use crate::api::dto::ApiResponse;
use crate::api::middleware::tracing::CorrelationId;
use crate::api::SharedState;
use crate::services::web_service::ClientErrorReport;
use crate::services::RequestContext;

#[derive(OpenApi)]
#[openapi(
    paths(report_error),
    components(schemas(ClientErrorReport, ApiResponse))
)]
pub struct TelemetryApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new().route("/api/report/errors", post(report_error))
}

/// Forward a client-side error to the backend.
///
/// Always accepted: a report that cannot be parsed or forwarded is logged
/// here and never surfaces to the page that sent it.
#[utoipa::path(
    post,
    path = "/api/report/errors",
    tag = "telemetry",
    request_body = ClientErrorReport,
    responses(
        (status = 202, description = "Report accepted", body = ApiResponse),
    )
)]
pub async fn report_error(
    State(state): State<SharedState>,
    ctx: RequestContext,
    correlation_id: Option<Extension<CorrelationId>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    let correlation_id = correlation_id.map(|Extension(id)| id.0).unwrap_or_default();

    match serde_json::from_slice::<ClientErrorReport>(&body) {
        Ok(report) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                url = report.url.as_deref().unwrap_or(""),
                "Client error: {}",
                report.message
            );
            if let Err(e) = state.web.report_error(&ctx, report).await {
                tracing::error!(correlation_id = %correlation_id, "Failed to forward client error report: {}", e);
            }
        }
        Err(e) => {
            tracing::debug!(correlation_id = %correlation_id, "Discarding malformed client error report: {}", e);
        }
    }

    (StatusCode::ACCEPTED, Json(ApiResponse::ok("Report received")))
}
