//! Correlation IDs and per-request spans.
//!
//! An incoming `X-Correlation-ID` is reused when it looks sane, otherwise the
//! trace id of a W3C `traceparent` header, otherwise a fresh UUID. The id is
//! echoed on the response so browser error reports can quote it.

use axum::{
    extract::Request,
    http::{header::HeaderValue, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

const TRACEPARENT_HEADER: &str = "traceparent";

/// Longest client-supplied id we accept
const MAX_ID_LEN: usize = 128;

/// Correlation id of the current request, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pick the id carried by the request headers, if any.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let explicit = headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| is_acceptable(id));

        explicit
            .map(|id| Self(id.to_string()))
            .or_else(|| {
                headers
                    .get(TRACEPARENT_HEADER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(trace_id_from_traceparent)
                    .map(Self)
            })
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

/// `version-traceid-parentid-flags`; the all-zero trace id is invalid.
fn trace_id_from_traceparent(value: &str) -> Option<String> {
    let mut parts = value.trim().split('-');
    let _version = parts.next()?;
    let trace_id = parts.next()?;
    let valid = trace_id.len() == 32
        && trace_id.bytes().all(|b| b.is_ascii_hexdigit())
        && trace_id.bytes().any(|b| b != b'0');
    valid.then(|| trace_id.to_ascii_lowercase())
}

/// Tag the request with a correlation id and run it inside an `http_request` span.
pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id =
        CorrelationId::from_headers(request.headers()).unwrap_or_else(CorrelationId::generate);

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(correlation_id.clone());

    async move {
        let mut response = next.run(request).await;
        if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }
        tracing::debug!(status = response.status().as_u16(), "Request finished");
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_generated_id_is_uuid() {
        assert!(Uuid::parse_str(CorrelationId::generate().as_str()).is_ok());
    }

    #[test]
    fn test_explicit_header_wins() {
        let map = headers(&[
            ("x-correlation-id", "req-42"),
            ("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        ]);
        assert_eq!(CorrelationId::from_headers(&map).unwrap().as_str(), "req-42");
    }

    #[test]
    fn test_traceparent_fallback() {
        let map = headers(&[(
            "traceparent",
            "00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01",
        )]);
        assert_eq!(
            CorrelationId::from_headers(&map).unwrap().as_str(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let long = "x".repeat(MAX_ID_LEN + 1);
        let map = headers(&[("x-correlation-id", long.as_str())]);
        assert!(CorrelationId::from_headers(&map).is_none());
        assert!(trace_id_from_traceparent("00-00000000000000000000000000000000-00f067aa0ba902b7-01").is_none());
        assert!(trace_id_from_traceparent("garbage").is_none());
    }
}
