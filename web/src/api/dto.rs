//! Shared Data Transfer Objects (DTOs) for API handlers.
//!
//! Every JSON endpoint answers with the `{success, message}` shape, possibly
//! extended with a payload field.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::ListQuery;

/// Default page size for admin listings
const DEFAULT_PER_PAGE: u32 = 20;
/// Largest page size a client may ask for
const MAX_PER_PAGE: u32 = 100;

/// Uniform result body for JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result of an image upload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
}

/// Body of the bulk-delete endpoints
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BulkIdsRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

impl BulkIdsRequest {
    /// Parse leniently: a missing, empty or malformed body yields no ids.
    pub fn from_body(body: &[u8]) -> Self {
        let mut request: Self = serde_json::from_slice(body).unwrap_or_default();
        request.ids.retain(|id| !id.trim().is_empty());
        request
    }
}

/// Listing parameters for admin tables.
///
/// Values are kept as strings so a malformed number falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub search: Option<String>,
}

impl PaginationQuery {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.parse().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .as_deref()
            .and_then(|p| p.parse::<u32>().ok())
            .map(|p| p.clamp(1, MAX_PER_PAGE))
            .unwrap_or(DEFAULT_PER_PAGE)
    }

    pub fn to_list_query(&self) -> ListQuery {
        ListQuery {
            page: Some(self.page()),
            per_page: Some(self.per_page()),
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_ids_lenient_parsing() {
        assert!(BulkIdsRequest::from_body(b"").ids.is_empty());
        assert!(BulkIdsRequest::from_body(b"{}").ids.is_empty());
        assert!(BulkIdsRequest::from_body(b"not json").ids.is_empty());
        assert!(BulkIdsRequest::from_body(br#"{"ids":[" "]}"#).ids.is_empty());
        assert_eq!(
            BulkIdsRequest::from_body(br#"{"ids":["a","b"]}"#).ids,
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let query = PaginationQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), DEFAULT_PER_PAGE);

        let query = PaginationQuery {
            page: Some("0".into()),
            per_page: Some("500".into()),
            search: Some("  ".into()),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), MAX_PER_PAGE);
        assert!(query.to_list_query().search.is_none());
    }

    #[test]
    fn test_pagination_malformed_numbers_fall_back() {
        let query = PaginationQuery {
            page: Some("abc".into()),
            per_page: Some("-3".into()),
            search: Some("tube".into()),
        };
        let list = query.to_list_query();
        assert_eq!(list.page, Some(1));
        assert_eq!(list.per_page, Some(DEFAULT_PER_PAGE));
        assert_eq!(list.search.as_deref(), Some("tube"));
    }
}
