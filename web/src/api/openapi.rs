//! OpenAPI document for the JSON endpoints, generated via utoipa.

use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Root document; handler modules contribute their paths via their own
/// `#[derive(OpenApi)]` structs merged in [`build_openapi`].
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VidGrab Web API",
        description = "JSON endpoints of the VidGrab web server.",
        version = "0.1.0",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "/", description = "Current server")),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "platforms", description = "Supported platforms"),
        (name = "downloads", description = "Download submission and management"),
        (name = "telemetry", description = "Browser error reports"),
        (name = "health", description = "Health checks"),
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

/// Error body returned by every endpoint on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Machine-readable error code (e.g. "NOT_FOUND", "BACKEND_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Registers the session cookie as the security scheme.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
        }
    }
}

pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(super::handlers::pages::PagesApiDoc::openapi());
    doc.merge(super::handlers::platforms::PlatformsApiDoc::openapi());
    doc.merge(super::handlers::downloads::DownloadsApiDoc::openapi());
    doc.merge(super::handlers::telemetry::TelemetryApiDoc::openapi());
    doc.merge(super::handlers::health::HealthApiDoc::openapi());
    doc
}

/// `GET /api/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(build_openapi())
}
