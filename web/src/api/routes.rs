//! Route table.

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::handlers::uploads::MAX_IMAGE_BYTES;
use super::middleware::auth::{require_admin, require_user};
use super::middleware::security_headers::security_headers_middleware;
use super::middleware::tracing::correlation_id_middleware;
use super::openapi::openapi_json;
use super::SharedState;

/// Multipart framing on top of the largest accepted image
const BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .merge(handlers::auth::router())
        .merge(handlers::pages::router())
        .merge(handlers::downloads::public_router())
        .merge(handlers::telemetry::router())
        .merge(handlers::seo::router());

    // Anonymous visitors are redirected to /login
    let signed_in = Router::new()
        .merge(handlers::account::router())
        .merge(handlers::downloads::user_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    // Non-admins are redirected to /
    let admin = Router::new()
        .merge(handlers::admin::router())
        .merge(handlers::platforms::admin_router())
        .merge(handlers::applications::admin_router())
        .merge(handlers::users::admin_router())
        .merge(handlers::downloads::admin_router())
        .merge(handlers::subscriptions::admin_router())
        .merge(handlers::settings::admin_router())
        .merge(handlers::server_status::admin_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public)
        .merge(signed_in)
        .merge(admin)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
