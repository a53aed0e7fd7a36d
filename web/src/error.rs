//! Application error types and result alias.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::api_client::ApiError;

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not found error
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend API call failed
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Static artifact storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Address parse error
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Status code, machine-readable code and user-facing message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Api(err) => match err {
                ApiError::Backend { message, .. } => {
                    (StatusCode::BAD_REQUEST, "BACKEND_ERROR", non_empty(message))
                }
                ApiError::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    "You must be signed in to do that".to_string(),
                ),
                ApiError::Transport(_) | ApiError::Decode(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "Something went wrong, please try again later".to_string(),
                ),
            },
            AppError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg.clone()),
            AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                "IO operation failed".to_string(),
            ),
            AppError::AddrParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ADDR_PARSE_ERROR",
                "Invalid address".to_string(),
            ),
            AppError::Json(_) => (StatusCode::BAD_REQUEST, "JSON_ERROR", "Invalid JSON".to_string()),
        }
    }
}

fn non_empty(message: &str) -> String {
    if message.trim().is_empty() {
        "Request failed".to_string()
    } else {
        message.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, code = code, "Request error");
        } else {
            tracing::warn!(error = %self, code = code, "Request rejected");
        }

        let body = Json(json!({
            "success": false,
            "code": code,
            "message": non_empty(&message),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_backend_error_is_bad_request_with_message() {
        let err = AppError::Api(ApiError::Backend {
            status: 422,
            message: "Slug already taken".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Slug already taken");
    }

    #[tokio::test]
    async fn test_empty_backend_message_gets_fallback() {
        let err = AppError::Api(ApiError::Backend {
            status: 400,
            message: "   ".into(),
        });
        let json = body_json(err.into_response()).await;
        assert_eq!(json["message"], "Request failed");
    }

    #[tokio::test]
    async fn test_decode_error_is_internal() {
        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = AppError::Api(ApiError::Decode(decode));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(!json["message"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_local_failures_map_to_status() {
        let cases = [
            (AppError::Config("API_BASE_URL".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::NotFound("Page".into()), StatusCode::NOT_FOUND),
            (AppError::Storage("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Io(std::io::Error::other("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::AddrParse("nope".parse::<std::net::SocketAddr>().unwrap_err()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Json(serde_json::from_str::<u32>("x").unwrap_err()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            let (status, _, message) = err.parts();
            assert_eq!(status, expected, "{err}");
            assert!(!message.is_empty());
        }
    }

    #[test]
    fn test_validation_parts() {
        let (status, code, message) = AppError::Validation("Name is required".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "Name is required");
    }
}
