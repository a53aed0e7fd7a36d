//! Data for the public pages: home, platform landing pages, and the
//! platform list.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use super::or_fallback;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::platform::Platform;
use crate::models::settings::{MonetizationSettings, Settings, WebsiteSettings};
use crate::services::RequestContext;

#[derive(OpenApi)]
#[openapi(
    paths(list_platforms),
    components(schemas(Platform, PageMeta))
)]
pub struct PagesApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/pages/home", get(home_page))
        .route("/api/pages/platforms/:slug", get(platform_page))
        .route("/api/platforms", get(list_platforms))
}

/// Localized title and description of a page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageMeta {
    pub locale: String,
    pub title: String,
    pub description: String,
}

struct MetaTemplate {
    home_title: &'static str,
    home_description: &'static str,
    platform_title: &'static str,
    platform_description: &'static str,
}

const EN: MetaTemplate = MetaTemplate {
    home_title: "{site} - Free online video downloader",
    home_description: "Download videos, audio and thumbnails from your favourite platforms with {site}.",
    platform_title: "{platform} video downloader - {site}",
    platform_description: "Save {platform} videos and audio in a few clicks with {site}. Free and fast.",
};

const FR: MetaTemplate = MetaTemplate {
    home_title: "{site} - Téléchargeur de vidéos en ligne gratuit",
    home_description: "Téléchargez vidéos, audio et miniatures de vos plateformes préférées avec {site}.",
    platform_title: "Téléchargeur de vidéos {platform} - {site}",
    platform_description: "Enregistrez les vidéos et l'audio de {platform} en quelques clics avec {site}.",
};

const ES: MetaTemplate = MetaTemplate {
    home_title: "{site} - Descargador de vídeos en línea gratis",
    home_description: "Descarga vídeos, audio y miniaturas de tus plataformas favoritas con {site}.",
    platform_title: "Descargador de vídeos de {platform} - {site}",
    platform_description: "Guarda vídeos y audio de {platform} en pocos clics con {site}.",
};

const DE: MetaTemplate = MetaTemplate {
    home_title: "{site} - Kostenloser Online-Video-Downloader",
    home_description: "Lade Videos, Audio und Vorschaubilder von deinen Lieblingsplattformen mit {site} herunter.",
    platform_title: "{platform} Video-Downloader - {site}",
    platform_description: "Speichere {platform}-Videos und Audio mit wenigen Klicks mit {site}.",
};

const PT: MetaTemplate = MetaTemplate {
    home_title: "{site} - Baixador de vídeos online grátis",
    home_description: "Baixe vídeos, áudio e miniaturas das suas plataformas favoritas com {site}.",
    platform_title: "Baixador de vídeos do {platform} - {site}",
    platform_description: "Salve vídeos e áudio do {platform} em poucos cliques com {site}.",
};

fn template(locale: &str) -> &'static MetaTemplate {
    match locale {
        "fr" => &FR,
        "es" => &ES,
        "de" => &DE,
        "pt" => &PT,
        _ => &EN,
    }
}

fn fill(text: &str, site: &str, platform: Option<&str>) -> String {
    text.replace("{site}", site)
        .replace("{platform}", platform.unwrap_or_default())
}

pub fn home_meta(locale: &str, site_name: &str) -> PageMeta {
    let t = template(locale);
    PageMeta {
        locale: locale.to_string(),
        title: fill(t.home_title, site_name, None),
        description: fill(t.home_description, site_name, None),
    }
}

pub fn platform_meta(locale: &str, site_name: &str, platform: &Platform) -> PageMeta {
    let t = template(locale);
    PageMeta {
        locale: locale.to_string(),
        title: fill(t.platform_title, site_name, Some(&platform.name)),
        description: platform
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| fill(t.platform_description, site_name, Some(&platform.name))),
    }
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub website: WebsiteSettings,
    pub monetization: MonetizationSettings,
    pub meta: PageMeta,
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Serialize)]
pub struct PlatformPage {
    pub website: WebsiteSettings,
    pub monetization: MonetizationSettings,
    pub meta: PageMeta,
    pub platform: Platform,
}

async fn load_settings(state: &SharedState, ctx: &RequestContext) -> Settings {
    or_fallback(state.settings.get_all(ctx).await, "site settings", Settings::default())
}

pub async fn home_page(State(state): State<SharedState>, ctx: RequestContext) -> Json<HomePage> {
    let (settings, platforms) = tokio::join!(
        load_settings(&state, &ctx),
        state.platforms.list_active(&ctx)
    );
    let platforms = or_fallback(platforms, "platform list", Vec::new());

    Json(HomePage {
        meta: home_meta(&ctx.locale, &settings.website.site_name),
        website: settings.website,
        monetization: settings.monetization,
        platforms,
    })
}

pub async fn platform_page(
    State(state): State<SharedState>,
    ctx: RequestContext,
    Path(slug): Path<String>,
) -> Result<Json<PlatformPage>> {
    let platform = match state.platforms.get_by_slug(&ctx, &slug).await {
        Ok(platform) if platform.is_active => platform,
        Ok(_) => return Err(AppError::NotFound(format!("Platform {}", slug))),
        Err(e) if e.is_not_found() => return Err(AppError::NotFound(format!("Platform {}", slug))),
        Err(e) => return Err(e.into()),
    };
    let settings = load_settings(&state, &ctx).await;

    Ok(Json(PlatformPage {
        meta: platform_meta(&ctx.locale, &settings.website.site_name, &platform),
        website: settings.website,
        monetization: settings.monetization,
        platform,
    }))
}

/// Active platforms for the public site
#[utoipa::path(
    get,
    path = "/api/platforms",
    tag = "platforms",
    responses(
        (status = 200, description = "Active platforms", body = Vec<Platform>),
        (status = 500, description = "Backend unavailable", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn list_platforms(
    State(state): State<SharedState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Platform>>> {
    Ok(Json(state.platforms.list_active(&ctx).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::platform::PlatformType;

    fn platform(description: Option<&str>) -> Platform {
        Platform {
            id: "p1".into(),
            name: "Vimeo".into(),
            slug: "vimeo".into(),
            platform_type: PlatformType::Video,
            url_pattern: None,
            is_active: true,
            is_premium: false,
            thumbnail: None,
            description: description.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_home_meta_localized() {
        assert_eq!(
            home_meta("fr", "VidGrab").title,
            "VidGrab - Téléchargeur de vidéos en ligne gratuit"
        );
    }

    #[test]
    fn test_unknown_locale_falls_back_to_english() {
        let meta = home_meta("ja", "VidGrab");
        assert_eq!(meta.locale, "ja");
        assert_eq!(meta.title, "VidGrab - Free online video downloader");
    }

    #[test]
    fn test_platform_meta_prefers_description() {
        let meta = platform_meta("en", "VidGrab", &platform(Some("Custom copy")));
        assert_eq!(meta.title, "Vimeo video downloader - VidGrab");
        assert_eq!(meta.description, "Custom copy");

        let meta = platform_meta("de", "VidGrab", &platform(None));
        assert!(meta.description.contains("Vimeo"));
    }
}
