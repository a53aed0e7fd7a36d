//! SEO and ads artifacts: ads.txt, robots.txt, sitemaps and RSS feeds.
//!
//! A static file in the storage backend always wins. When none exists the
//! artifact is rendered from its template, persisted, and served; later
//! requests get the stored bytes unchanged.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::platform_service::PlatformService;
use super::settings_service::SettingsService;
use super::RequestContext;
use crate::config::Config;
use crate::models::platform::Platform;
use crate::models::settings::Settings;
use crate::storage::StorageBackend;

/// Public pages listed in every sitemap, relative to the locale root
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("", "daily", "1.0"),
    ("/platforms", "weekly", "0.8"),
    ("/about", "monthly", "0.5"),
    ("/contact", "monthly", "0.5"),
    ("/privacy", "yearly", "0.3"),
    ("/terms", "yearly", "0.3"),
];

/// A generated static artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    AdsTxt,
    RobotsTxt,
    Sitemap { locale: Option<String> },
    Rss { locale: Option<String> },
}

impl Artifact {
    /// Storage key, e.g. `ads.txt` or `fr/sitemap.xml`
    pub fn key(&self) -> String {
        match self {
            Artifact::AdsTxt => "ads.txt".to_string(),
            Artifact::RobotsTxt => "robots.txt".to_string(),
            Artifact::Sitemap { locale: None } => "sitemap.xml".to_string(),
            Artifact::Sitemap { locale: Some(l) } => format!("{}/sitemap.xml", l),
            Artifact::Rss { locale: None } => "rss.xml".to_string(),
            Artifact::Rss { locale: Some(l) } => format!("{}/rss.xml", l),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Artifact::AdsTxt | Artifact::RobotsTxt => "text/plain; charset=utf-8",
            Artifact::Sitemap { .. } => "application/xml; charset=utf-8",
            Artifact::Rss { .. } => "application/rss+xml; charset=utf-8",
        }
    }

    fn needs_platforms(&self) -> bool {
        matches!(self, Artifact::Sitemap { .. } | Artifact::Rss { .. })
    }
}

/// Outcome of serving an artifact
#[derive(Debug, Clone)]
pub struct ServedArtifact {
    pub content: Bytes,
    pub content_type: &'static str,
    /// Rendered during this request rather than read from storage
    pub generated: bool,
    /// False when storage failed; the content is still the rendered default
    pub stored: bool,
}

pub struct SeoService {
    storage: Arc<dyn StorageBackend>,
    platforms: Arc<PlatformService>,
    settings: Arc<SettingsService>,
    config: Arc<Config>,
    generation_lock: Mutex<()>,
}

impl SeoService {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        platforms: Arc<PlatformService>,
        settings: Arc<SettingsService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            storage,
            platforms,
            settings,
            config,
            generation_lock: Mutex::new(()),
        }
    }

    /// Serve the stored artifact, generating and persisting it on first use.
    pub async fn serve(&self, ctx: &RequestContext, artifact: &Artifact) -> ServedArtifact {
        let key = artifact.key();

        if let Some(content) = self.read_stored(&key).await {
            return ServedArtifact {
                content,
                content_type: artifact.content_type(),
                generated: false,
                stored: true,
            };
        }

        // Serialize generation so concurrent first requests produce one file
        let _guard = self.generation_lock.lock().await;
        if let Some(content) = self.read_stored(&key).await {
            return ServedArtifact {
                content,
                content_type: artifact.content_type(),
                generated: false,
                stored: true,
            };
        }

        let content = Bytes::from(self.render(ctx, artifact).await);
        let stored = match self.storage.put(&key, content.clone()).await {
            Ok(()) => {
                tracing::info!(key = %key, bytes = content.len(), "Generated static artifact");
                true
            }
            Err(e) => {
                tracing::error!(key = %key, "Failed to persist generated artifact: {}", e);
                false
            }
        };

        ServedArtifact {
            content,
            content_type: artifact.content_type(),
            generated: true,
            stored,
        }
    }

    /// Drop stored copies so the next request regenerates them.
    pub async fn invalidate(&self, artifacts: &[Artifact]) {
        let _guard = self.generation_lock.lock().await;
        for artifact in artifacts {
            let key = artifact.key();
            match self.storage.delete(&key).await {
                Ok(()) => tracing::debug!(key = %key, "Invalidated static artifact"),
                Err(e) => tracing::warn!(key = %key, "Failed to invalidate static artifact: {}", e),
            }
        }
    }

    /// Sitemaps and feeds at the root and under every supported locale.
    pub fn listing_artifacts(&self) -> Vec<Artifact> {
        std::iter::once(None)
            .chain(self.config.supported_locales.iter().cloned().map(Some))
            .flat_map(|locale| {
                [
                    Artifact::Sitemap {
                        locale: locale.clone(),
                    },
                    Artifact::Rss { locale },
                ]
            })
            .collect()
    }

    async fn read_stored(&self, key: &str) -> Option<Bytes> {
        match self.storage.exists(key).await {
            Ok(true) => match self.storage.get(key).await {
                Ok(content) => Some(content),
                Err(e) => {
                    tracing::error!(key = %key, "Failed to read static artifact: {}", e);
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::error!(key = %key, "Failed to stat static artifact: {}", e);
                None
            }
        }
    }

    /// Render an artifact from its template with live data where available.
    pub async fn render(&self, ctx: &RequestContext, artifact: &Artifact) -> String {
        let settings = match self.settings.get_all(ctx).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Settings unavailable for {}, using defaults: {}", artifact.key(), e);
                Settings::default()
            }
        };

        let platforms = if artifact.needs_platforms() {
            match self.platforms.list_active(ctx).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("Platform list unavailable for {}: {}", artifact.key(), e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        match artifact {
            Artifact::AdsTxt => {
                let publisher = self
                    .config
                    .adsense_publisher_id
                    .clone()
                    .or(settings.monetization.adsense_publisher_id.clone());
                render_ads_txt(&self.config.site_url, publisher.as_deref())
            }
            Artifact::RobotsTxt => render_robots_txt(&self.config.site_url),
            Artifact::Sitemap { locale } => render_sitemap(
                &self.config.site_url,
                &self.config.supported_locales,
                locale.as_deref(),
                &platforms,
            ),
            Artifact::Rss { locale } => render_rss(
                &self.config.site_url,
                locale.as_deref(),
                &settings,
                &platforms,
                Utc::now(),
            ),
        }
    }
}

/// Normalize `ca-pub-123`, `pub-123` or `123` to `pub-123`.
fn normalize_publisher_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    let id = id.strip_prefix("ca-").unwrap_or(id);
    let digits = id.strip_prefix("pub-").unwrap_or(id);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("pub-{}", digits))
}

pub fn render_ads_txt(site_url: &str, publisher_id: Option<&str>) -> String {
    match publisher_id.and_then(normalize_publisher_id) {
        Some(publisher) => format!("google.com, {}, DIRECT, f08c47fec0942fa0\n", publisher),
        None => format!(
            "# ads.txt for {}\n# No authorized digital sellers configured.\n",
            site_url
        ),
    }
}

pub fn render_robots_txt(site_url: &str) -> String {
    format!(
        "User-agent: *\n\
         Allow: /\n\
         Disallow: /admin\n\
         Disallow: /account\n\
         Disallow: /api/\n\
         \n\
         Sitemap: {}/sitemap.xml\n",
        site_url
    )
}

fn localized_url(site_url: &str, locale: Option<&str>, path: &str) -> String {
    match locale {
        Some(l) => format!("{}/{}{}", site_url, l, path),
        None => format!("{}{}", site_url, if path.is_empty() { "/" } else { path }),
    }
}

pub fn render_sitemap(
    site_url: &str,
    locales: &[String],
    locale: Option<&str>,
    platforms: &[Platform],
) -> String {
    let mut paths: Vec<(String, &str, &str, Option<DateTime<Utc>>)> = STATIC_PAGES
        .iter()
        .map(|(path, freq, prio)| (path.to_string(), *freq, *prio, None))
        .collect();
    paths.extend(platforms.iter().map(|p| {
        (
            format!("/platforms/{}", p.slug),
            "weekly",
            "0.7",
            p.updated_at.or(p.created_at),
        )
    }));

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    for (path, freq, prio, lastmod) in &paths {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            xml_escape(&localized_url(site_url, locale, path))
        ));
        for alt in locales {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                xml_escape(alt),
                xml_escape(&localized_url(site_url, Some(alt), path))
            ));
        }
        if let Some(lastmod) = lastmod {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.format("%Y-%m-%d")
            ));
        }
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", freq));
        xml.push_str(&format!("    <priority>{}</priority>\n", prio));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn render_rss(
    site_url: &str,
    locale: Option<&str>,
    settings: &Settings,
    platforms: &[Platform],
    now: DateTime<Utc>,
) -> String {
    let link = localized_url(site_url, locale, "");
    let language = locale.unwrap_or(settings.website.default_language.as_str());

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n\
         <channel>\n",
    );
    xml.push_str(&format!(
        "  <title>{}</title>\n",
        xml_escape(&settings.website.site_name)
    ));
    xml.push_str(&format!("  <link>{}</link>\n", xml_escape(&link)));
    xml.push_str(&format!(
        "  <description>{}</description>\n",
        xml_escape(&settings.website.site_description)
    ));
    xml.push_str(&format!("  <language>{}</language>\n", xml_escape(language)));
    xml.push_str(&format!("  <lastBuildDate>{}</lastBuildDate>\n", now.to_rfc2822()));
    xml.push_str(&format!(
        "  <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        xml_escape(&localized_url(site_url, locale, "/rss.xml"))
    ));

    for platform in platforms {
        let item_link = localized_url(site_url, locale, &format!("/platforms/{}", platform.slug));
        let description = platform
            .description
            .clone()
            .unwrap_or_else(|| format!("Download {} videos with {}", platform.name, settings.website.site_name));
        xml.push_str("  <item>\n");
        xml.push_str(&format!(
            "    <title>{} downloader</title>\n",
            xml_escape(&platform.name)
        ));
        xml.push_str(&format!("    <link>{}</link>\n", xml_escape(&item_link)));
        xml.push_str(&format!("    <guid>{}</guid>\n", xml_escape(&item_link)));
        xml.push_str(&format!(
            "    <description>{}</description>\n",
            xml_escape(&description)
        ));
        if let Some(date) = platform.updated_at.or(platform.created_at) {
            xml.push_str(&format!("    <pubDate>{}</pubDate>\n", date.to_rfc2822()));
        }
        xml.push_str("  </item>\n");
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::platform::PlatformType;

    fn platform(slug: &str, name: &str) -> Platform {
        Platform {
            id: slug.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            platform_type: PlatformType::Video,
            url_pattern: None,
            is_active: true,
            is_premium: false,
            thumbnail: None,
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_artifact_keys() {
        assert_eq!(Artifact::AdsTxt.key(), "ads.txt");
        assert_eq!(Artifact::Sitemap { locale: None }.key(), "sitemap.xml");
        assert_eq!(
            Artifact::Rss {
                locale: Some("fr".into())
            }
            .key(),
            "fr/rss.xml"
        );
    }

    #[test]
    fn test_publisher_id_normalization() {
        assert_eq!(normalize_publisher_id("ca-pub-123"), Some("pub-123".into()));
        assert_eq!(normalize_publisher_id("pub-456"), Some("pub-456".into()));
        assert_eq!(normalize_publisher_id("789"), Some("pub-789".into()));
        assert_eq!(normalize_publisher_id("pub-abc"), None);
        assert_eq!(normalize_publisher_id(""), None);
    }

    #[test]
    fn test_ads_txt_with_and_without_publisher() {
        assert_eq!(
            render_ads_txt("https://x.test", Some("ca-pub-42")),
            "google.com, pub-42, DIRECT, f08c47fec0942fa0\n"
        );
        assert!(render_ads_txt("https://x.test", None).starts_with("# ads.txt for https://x.test"));
    }

    #[test]
    fn test_robots_points_at_sitemap() {
        let robots = render_robots_txt("https://x.test");
        assert!(robots.contains("Disallow: /admin"));
        assert!(robots.contains("Sitemap: https://x.test/sitemap.xml"));
    }

    #[test]
    fn test_sitemap_lists_pages_platforms_and_alternates() {
        let locales = vec!["en".to_string(), "fr".to_string()];
        let xml = render_sitemap(
            "https://x.test",
            &locales,
            Some("fr"),
            &[platform("you-tube", "You & Tube")],
        );
        assert!(xml.contains("<loc>https://x.test/fr</loc>"));
        assert!(xml.contains("<loc>https://x.test/fr/platforms/you-tube</loc>"));
        assert!(xml.contains("hreflang=\"en\" href=\"https://x.test/en/about\""));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_root_sitemap_uses_unprefixed_urls() {
        let xml = render_sitemap("https://x.test", &["en".to_string()], None, &[]);
        assert!(xml.contains("<loc>https://x.test/</loc>"));
        assert!(xml.contains("<loc>https://x.test/terms</loc>"));
    }

    #[test]
    fn test_rss_escapes_names() {
        let xml = render_rss(
            "https://x.test",
            None,
            &Settings::default(),
            &[platform("a", "A&B")],
            Utc::now(),
        );
        assert!(xml.contains("<title>A&amp;B downloader</title>"));
        assert!(xml.contains("<title>VidGrab</title>"));
        assert!(xml.contains("<language>en</language>"));
    }

    #[tokio::test]
    async fn test_invalidate_forces_regeneration() {
        use crate::services::api_client::ApiClient;
        use crate::storage::filesystem::FilesystemStorage;

        let dir = tempfile::tempdir().unwrap();
        // Nothing listens on the discard port; settings fall back to defaults
        let mut config = Config::for_backend("http://127.0.0.1:9", dir.path().to_string_lossy());
        config.supported_locales = vec!["en".into(), "fr".into()];
        let config = Arc::new(config);
        let api = Arc::new(ApiClient::new(&config).unwrap());
        let seo = SeoService::new(
            Arc::new(FilesystemStorage::new(dir.path())),
            Arc::new(PlatformService::new(api.clone())),
            Arc::new(SettingsService::new(api)),
            config,
        );
        let ctx = RequestContext::anonymous("en");

        let first = seo.serve(&ctx, &Artifact::AdsTxt).await;
        assert!(first.generated && first.stored);
        assert!(!seo.serve(&ctx, &Artifact::AdsTxt).await.generated);

        seo.invalidate(&[Artifact::AdsTxt, Artifact::RobotsTxt]).await;
        assert!(!dir.path().join("ads.txt").exists());
        assert!(seo.serve(&ctx, &Artifact::AdsTxt).await.generated);

        let keys: Vec<String> = seo.listing_artifacts().iter().map(Artifact::key).collect();
        assert_eq!(
            keys,
            vec!["sitemap.xml", "rss.xml", "en/sitemap.xml", "en/rss.xml", "fr/sitemap.xml", "fr/rss.xml"]
        );
    }
}
