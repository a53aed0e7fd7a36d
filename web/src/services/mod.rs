//! Domain services.
//!
//! One service per backend resource. Services are stateless wrappers over the
//! shared [`api_client::ApiClient`]: they are built once at startup and every
//! operation takes the caller's [`RequestContext`] explicitly.

pub mod api_client;
pub mod application_service;
pub mod auth_service;
pub mod download_service;
pub mod platform_service;
pub mod seo_service;
pub mod server_status_service;
pub mod settings_service;
pub mod subscription_service;
pub mod user_service;
pub mod web_service;

use serde::Serialize;

use api_client::ApiError;

/// Result of a service call
pub type ServiceResult<T> = std::result::Result<T, ApiError>;

/// Per-request credentials and locale passed to every service call.
#[derive(Clone, Default)]
pub struct RequestContext {
    pub token: Option<String>,
    pub locale: String,
}

redacted_debug!(RequestContext {
    redact_option token,
    show locale,
});

impl RequestContext {
    pub fn new(token: Option<String>, locale: impl Into<String>) -> Self {
        Self {
            token,
            locale: locale.into(),
        }
    }

    pub fn anonymous(locale: impl Into<String>) -> Self {
        Self::new(None, locale)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Query parameters shared by list endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    pub fn first_page(per_page: u32) -> Self {
        Self {
            page: Some(1),
            per_page: Some(per_page),
            search: None,
        }
    }
}

/// Body of every bulk-delete call
#[derive(Debug, Serialize)]
pub(crate) struct BulkIds<'a> {
    pub ids: &'a [String],
}

/// Append an encoded query string to `path` when `query` has any fields set.
pub(crate) fn with_query<Q: Serialize>(path: &str, query: &Q) -> String {
    match serde_urlencoded::to_string(query) {
        Ok(qs) if !qs.is_empty() => format!("{}?{}", path, qs),
        _ => path.to_string(),
    }
}

/// Percent-encode a path segment taken from user input.
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_skips_empty() {
        assert_eq!(with_query("/users", &ListQuery::default()), "/users");
    }

    #[test]
    fn test_with_query_encodes_fields() {
        let query = ListQuery {
            page: Some(2),
            per_page: Some(20),
            search: Some("a b".into()),
        };
        assert_eq!(
            with_query("/users", &query),
            "/users?page=2&per_page=20&search=a+b"
        );
    }

    #[test]
    fn test_segment_escapes_reserved_characters() {
        assert_eq!(segment("abc-123"), "abc-123");
        assert_eq!(segment("../etc"), "..%2Fetc");
        assert_eq!(segment("a b?"), "a%20b%3F");
    }

    #[test]
    fn test_context_debug_hides_token() {
        let ctx = RequestContext::new(Some("secret-token".into()), "en");
        assert!(ctx.is_authenticated());
        assert!(!format!("{:?}", ctx).contains("secret-token"));
    }
}
