//! ads.txt, robots.txt, sitemaps and RSS feeds.

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::api::SharedState;
use crate::error::AppError;
use crate::services::seo_service::Artifact;
use crate::services::RequestContext;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/ads.txt", get(ads_txt))
        .route("/robots.txt", get(robots_txt))
        .route("/sitemap.xml", get(sitemap))
        .route("/rss.xml", get(rss))
        .route("/:locale/sitemap.xml", get(localized_sitemap))
        .route("/:locale/rss.xml", get(localized_rss))
}

async fn serve(state: &SharedState, ctx: &RequestContext, artifact: Artifact) -> Response {
    let served = state.seo.serve(ctx, &artifact).await;
    let status = if served.stored {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, [(CONTENT_TYPE, served.content_type)], served.content).into_response()
}

fn check_locale(state: &SharedState, locale: &str) -> Result<(), Response> {
    if state.config.is_supported_locale(locale) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Locale {}", locale)).into_response())
    }
}

pub async fn ads_txt(State(state): State<SharedState>, ctx: RequestContext) -> Response {
    serve(&state, &ctx, Artifact::AdsTxt).await
}

pub async fn robots_txt(State(state): State<SharedState>, ctx: RequestContext) -> Response {
    serve(&state, &ctx, Artifact::RobotsTxt).await
}

pub async fn sitemap(State(state): State<SharedState>, ctx: RequestContext) -> Response {
    serve(&state, &ctx, Artifact::Sitemap { locale: None }).await
}

pub async fn rss(State(state): State<SharedState>, ctx: RequestContext) -> Response {
    serve(&state, &ctx, Artifact::Rss { locale: None }).await
}

pub async fn localized_sitemap(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(locale): Path<String>,
) -> Response {
    if let Err(response) = check_locale(&state, &locale) {
        return response;
    }
    serve(&state, &ctx, Artifact::Sitemap { locale: Some(locale) }).await
}

pub async fn localized_rss(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(locale): Path<String>,
) -> Response {
    if let Err(response) = check_locale(&state, &locale) {
        return response;
    }
    serve(&state, &ctx, Artifact::Rss { locale: Some(locale) }).await
}
