//! HTTP request handlers.

pub mod account;
pub mod admin;
pub mod applications;
pub mod auth;
pub mod downloads;
pub mod health;
pub mod pages;
pub mod platforms;
pub mod seo;
pub mod server_status;
pub mod settings;
pub mod subscriptions;
pub mod telemetry;
pub mod uploads;
pub mod users;

use std::future::Future;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use super::dto::{ApiResponse, BulkIdsRequest};
use super::forms::FormFailure;
use crate::error::AppError;
use crate::services::api_client::ApiError;
use crate::services::ServiceResult;

/// Failure of a form action: either the form itself or the service call.
#[derive(Debug)]
pub enum ActionError {
    Form(FormFailure),
    App(AppError),
}

impl From<FormFailure> for ActionError {
    fn from(failure: FormFailure) -> Self {
        Self::Form(failure)
    }
}

impl From<AppError> for ActionError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ApiError> for ActionError {
    fn from(err: ApiError) -> Self {
        Self::App(AppError::Api(err))
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match self {
            ActionError::Form(failure) => failure.into_response(),
            ActionError::App(err) => err.into_response(),
        }
    }
}

pub type ActionResult = std::result::Result<Response, ActionError>;

/// POST-redirect-GET
pub(crate) fn see_other(location: &str) -> ActionResult {
    Ok(Redirect::to(location).into_response())
}

/// Use the value of a secondary fetch, or log and fall back.
pub(crate) fn or_fallback<T>(result: ServiceResult<T>, what: &str, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to load {}, continuing without it: {}", what, e);
            fallback
        }
    }
}

/// Shared flow of the `/<resource>/bulk` endpoints.
///
/// An empty id list is rejected before the backend is called.
pub(crate) async fn bulk_delete<F, Fut>(body: &[u8], resource: &str, delete: F) -> Response
where
    F: FnOnce(Vec<String>) -> Fut,
    Fut: Future<Output = ServiceResult<()>>,
{
    let request = BulkIdsRequest::from_body(body);
    if request.ids.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failed("No ids provided")),
        )
            .into_response();
    }

    let count = request.ids.len();
    match delete(request.ids).await {
        Ok(()) => {
            tracing::info!(resource = resource, count = count, "Bulk delete completed");
            Json(ApiResponse::ok(format!(
                "{} {}s deleted successfully",
                count, resource
            )))
            .into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Shared flow of the single-record `DELETE` endpoints.
pub(crate) async fn delete_one<Fut>(label: &str, delete: Fut) -> Response
where
    Fut: Future<Output = ServiceResult<()>>,
{
    match delete.await {
        Ok(()) => Json(ApiResponse::ok(format!("{} deleted successfully", label))).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_bulk_delete_empty_ids_skips_service() {
        let called = AtomicBool::new(false);
        let response = bulk_delete(br#"{"ids":[]}"#, "platform", |_| async {
            called.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!called.load(Ordering::SeqCst));
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No ids provided");
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_count() {
        let response = bulk_delete(br#"{"ids":["a","b","c"]}"#, "user", |ids| async move {
            assert_eq!(ids.len(), 3);
            Ok(())
        })
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "3 users deleted successfully");
    }

    #[tokio::test]
    async fn test_bulk_delete_backend_failure() {
        let response = bulk_delete(br#"{"ids":["a"]}"#, "download", |_| async {
            Err(ApiError::Backend {
                status: 422,
                message: "Task is still running".into(),
            })
        })
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Task is still running");
    }

    #[tokio::test]
    async fn test_delete_one_message() {
        let response = delete_one("Download", async { Ok(()) }).await;
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Download deleted successfully");
    }

    #[test]
    fn test_or_fallback() {
        let failed: ServiceResult<Vec<u8>> = Err(ApiError::Unauthenticated);
        assert!(or_fallback(failed, "things", Vec::new()).is_empty());
        assert_eq!(or_fallback(Ok(5), "five", 0), 5);
    }
}
