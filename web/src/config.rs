//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Backend REST API base URL
    pub api_base_url: String,

    /// Optional API key sent as `X-API-Key` on every backend call
    pub api_key: Option<String>,

    /// Backend request timeout in seconds
    pub api_timeout_secs: u64,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Public URL of this site, used in sitemap/rss/robots output
    pub site_url: String,

    /// Directory holding ads.txt, robots.txt, sitemaps and feeds
    pub static_dir: String,

    /// Locales the site is served in
    pub supported_locales: Vec<String>,

    /// Locale used when the request does not pick a supported one
    pub default_locale: String,

    /// Name of the session cookie carrying the backend token
    pub session_cookie_name: String,

    /// Session cookie lifetime in days
    pub session_max_age_days: i64,

    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,

    /// AdSense publisher id used for the generated ads.txt
    pub adsense_publisher_id: Option<String>,

    /// Origins allowed to call the JSON endpoints with credentials
    pub cors_origins: Vec<String>,

    /// Deployment environment name (development, production, ...)
    pub environment: String,

    /// OTLP collector endpoint (optional)
    pub otel_endpoint: Option<String>,

    /// Log level
    pub log_level: String,
}

redacted_debug!(Config {
    show api_base_url,
    redact_option api_key,
    show api_timeout_secs,
    show bind_address,
    show site_url,
    show static_dir,
    show supported_locales,
    show default_locale,
    show session_cookie_name,
    show session_max_age_days,
    show cookie_secure,
    show adsense_publisher_id,
    show cors_origins,
    show environment,
    show otel_endpoint,
    show log_level,
});

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let default_locale = env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".into());
        let mut supported_locales = parse_locales(
            &env::var("SUPPORTED_LOCALES").unwrap_or_else(|_| default_locale.clone()),
        );
        if !supported_locales.contains(&default_locale) {
            supported_locales.insert(0, default_locale.clone());
        }

        let site_url = env::var("SITE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();
        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => parse_list(&raw),
            Err(_) => vec![site_url.clone()],
        };

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map_err(|_| AppError::Config("API_BASE_URL not set".into()))?
                .trim_end_matches('/')
                .to_string(),
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            api_timeout_secs: env::var("API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            site_url,
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into()),
            supported_locales,
            default_locale,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session".into()),
            session_max_age_days: env::var("SESSION_MAX_AGE_DAYS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            adsense_publisher_id: env::var("ADSENSE_PUBLISHER_ID").ok().filter(|v| !v.is_empty()),
            cors_origins,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            otel_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        })
    }

    /// Configuration pointing at the given backend, with defaults for everything else.
    pub fn for_backend(api_base_url: impl Into<String>, static_dir: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            api_timeout_secs: 30,
            bind_address: "127.0.0.1:3000".into(),
            site_url: "http://localhost:3000".into(),
            static_dir: static_dir.into(),
            supported_locales: vec!["en".into()],
            default_locale: "en".into(),
            session_cookie_name: "session".into(),
            session_max_age_days: 30,
            cookie_secure: false,
            adsense_publisher_id: None,
            cors_origins: vec!["http://localhost:3000".into()],
            environment: "test".into(),
            otel_endpoint: None,
            log_level: "info".into(),
        }
    }

    /// Whether `locale` is one the site is served in.
    pub fn is_supported_locale(&self, locale: &str) -> bool {
        self.supported_locales.iter().any(|l| l == locale)
    }
}

fn parse_locales(raw: &str) -> Vec<String> {
    parse_list(raw).into_iter().map(|s| s.to_lowercase()).collect()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locales_trims_and_lowercases() {
        assert_eq!(parse_locales(" en, FR ,,es"), vec!["en", "fr", "es"]);
    }

    #[test]
    fn test_parse_list_drops_trailing_slashes() {
        assert_eq!(
            parse_list("https://a.test/, https://b.test"),
            vec!["https://a.test", "https://b.test"]
        );
    }

    #[test]
    fn test_for_backend_trims_trailing_slash() {
        let config = Config::for_backend("http://api.local/", "/tmp/static");
        assert_eq!(config.api_base_url, "http://api.local");
        assert!(config.is_supported_locale("en"));
        assert!(!config.is_supported_locale("de"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = Config::for_backend("http://api.local", "/tmp");
        config.api_key = Some("very-secret-key".into());
        let output = format!("{:?}", config);
        assert!(!output.contains("very-secret-key"));
        assert!(output.contains("[REDACTED]"));
    }
}
