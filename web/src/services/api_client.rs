//! Backend REST API client.
//!
//! Every outbound call goes through [`ApiClient::request`], which attaches the
//! standard headers and the session's bearer token, then normalizes both
//! non-2xx responses and transport failures into an [`ApiError`]. Nothing
//! past this boundary panics or leaks a raw `reqwest` error type.

use bytes::Bytes;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::RequestContext;
use crate::config::Config;

/// Errors returned by backend calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a failure; `message` is its own text.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// A protected call was attempted without a session token.
    #[error("Not signed in")]
    Unauthenticated,

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the backend rejected the session token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
            || matches!(self, ApiError::Backend { status: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Backend { status: 404, .. })
    }
}

/// A file forwarded to the backend as multipart form data.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Backend REST API client
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

redacted_debug!(ApiClient {
    show base_url,
    redact_option api_key,
});

impl ApiClient {
    /// Create a new client for the configured backend
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .user_agent(concat!("vidgrab-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request with standard headers and, unless `public`, the bearer token.
    fn builder(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        public: bool,
    ) -> Result<RequestBuilder, ApiError> {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, ctx.locale.as_str());

        if let Some(api_key) = &self.api_key {
            builder = builder.header("X-API-Key", api_key);
        }

        if !public {
            let token = ctx.token.as_deref().ok_or(ApiError::Unauthenticated)?;
            builder = builder.bearer_auth(token);
        } else if let Some(token) = ctx.token.as_deref() {
            // Public endpoints still personalize results for signed-in users.
            builder = builder.bearer_auth(token);
        }

        Ok(builder)
    }

    /// Issue a call and decode its payload.
    pub async fn request<T, B>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<&B>,
        public: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.builder(ctx, method.clone(), path, public)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %method, path, "Backend request failed: {}", e);
            ApiError::from(e)
        })?;

        Self::handle_response(response).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        public: bool,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(ctx, Method::GET, path, None, public).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
        public: bool,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::POST, path, Some(body), public).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::PUT, path, Some(body), false).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> Result<T, ApiError> {
        self.request::<T, ()>(ctx, Method::DELETE, path, None, false).await
    }

    /// Forward a file as multipart form data under `field`.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        field: &str,
        file: FileUpload,
    ) -> Result<T, ApiError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part(field.to_string(), part);

        let response = self
            .builder(ctx, Method::POST, path, false)?
            .multipart(form)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Check if the backend is reachable
    pub async fn ping(&self) -> bool {
        match self.client.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Backend ping failed: {}", e);
                false
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        decode_payload(status, &bytes)
    }
}

/// Turn a raw backend response into the payload or an error.
///
/// Bodies may be bare payloads or `{success, message, data}` envelopes; an
/// empty body decodes as JSON `null`.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
) -> Result<T, ApiError> {
    if !status.is_success() {
        let value = serde_json::from_slice::<Value>(bytes).ok();
        let message = value
            .as_ref()
            .and_then(extract_message)
            .or_else(|| {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                (!text.is_empty() && text.len() <= 200 && !text.starts_with('<')).then_some(text)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        return Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(bytes)?
    };

    match value {
        Value::Object(mut map) => {
            if map.get("success") == Some(&Value::Bool(false)) {
                let message = extract_message(&Value::Object(map.clone()))
                    .unwrap_or_else(|| "Request failed".to_string());
                return Err(ApiError::Backend {
                    status: status.as_u16(),
                    message,
                });
            }
            match map.remove("data") {
                Some(data) => Ok(serde_json::from_value(data)?),
                None => Ok(serde_json::from_value(Value::Object(map))?),
            }
        }
        other => Ok(serde_json::from_value(other)?),
    }
}

fn extract_message(value: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::IgnoredAny;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_bare_payload() {
        let item: Item = decode_payload(StatusCode::OK, br#"{"id":"a"}"#).unwrap();
        assert_eq!(item, Item { id: "a".into() });
    }

    #[test]
    fn test_enveloped_payload() {
        let item: Item =
            decode_payload(StatusCode::OK, br#"{"success":true,"data":{"id":"b"}}"#).unwrap();
        assert_eq!(item.id, "b");
    }

    #[test]
    fn test_success_false_is_error_even_with_2xx() {
        let err = decode_payload::<IgnoredAny>(
            StatusCode::OK,
            br#"{"success":false,"message":"Quota exceeded"}"#,
        )
        .unwrap_err();
        match err {
            ApiError::Backend { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_2xx_uses_backend_message() {
        let err = decode_payload::<IgnoredAny>(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"error":"Slug already exists"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Slug already exists");
    }

    #[test]
    fn test_non_2xx_without_body_uses_reason() {
        let err = decode_payload::<IgnoredAny>(StatusCode::NOT_FOUND, b"").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn test_non_2xx_html_body_is_not_echoed() {
        let err = decode_payload::<IgnoredAny>(
            StatusCode::BAD_GATEWAY,
            b"<html><body>upstream down</body></html>",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_empty_body_decodes_as_unit() {
        decode_payload::<()>(StatusCode::NO_CONTENT, b"").unwrap();
    }

    #[test]
    fn test_garbage_success_body_is_decode_error() {
        let err = decode_payload::<Item>(StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(ApiError::Unauthenticated.is_unauthorized());
        assert!(ApiError::Backend {
            status: 401,
            message: "expired".into()
        }
        .is_unauthorized());
        assert!(!ApiError::Backend {
            status: 403,
            message: "nope".into()
        }
        .is_unauthorized());
    }

    #[tokio::test]
    async fn test_protected_call_without_token_fails_locally() {
        let config = Config::for_backend("http://127.0.0.1:9", "/tmp");
        let client = ApiClient::new(&config).unwrap();
        let ctx = RequestContext::anonymous("en");
        let err = client
            .get::<IgnoredAny>(&ctx, "/users", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let config = Config::for_backend("http://127.0.0.1:9", "/tmp");
        let client = ApiClient::new(&config).unwrap();
        let ctx = RequestContext::anonymous("en");
        let err = client
            .get::<IgnoredAny>(&ctx, "/platforms", true)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!client.ping().await);
    }
}
