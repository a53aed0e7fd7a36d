//! API module - HTTP handlers and middleware.

pub mod dto;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::api_client::ApiClient;
use crate::services::application_service::ApplicationService;
use crate::services::auth_service::AuthService;
use crate::services::download_service::DownloadService;
use crate::services::platform_service::PlatformService;
use crate::services::seo_service::SeoService;
use crate::services::server_status_service::ServerStatusService;
use crate::services::settings_service::SettingsService;
use crate::services::subscription_service::SubscriptionService;
use crate::services::user_service::UserService;
use crate::services::web_service::WebService;
use crate::storage::filesystem::FilesystemStorage;
use crate::storage::StorageBackend;

/// Application state shared across handlers.
///
/// Every service is built once here; handlers pass the per-request
/// [`RequestContext`](crate::services::RequestContext) into each call.
pub struct AppState {
    pub config: Arc<Config>,
    pub api: Arc<ApiClient>,
    pub auth: AuthService,
    pub users: UserService,
    pub platforms: Arc<PlatformService>,
    pub applications: ApplicationService,
    pub downloads: DownloadService,
    pub settings: Arc<SettingsService>,
    pub subscriptions: SubscriptionService,
    pub server_status: ServerStatusService,
    pub web: WebService,
    pub seo: SeoService,
}

impl AppState {
    /// Build state with artifacts stored under `config.static_dir`.
    pub fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(FilesystemStorage::new(config.static_dir.clone()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        let config = Arc::new(config);
        let api = Arc::new(ApiClient::new(&config).map_err(|e| {
            AppError::Config(format!("Failed to build backend client: {}", e))
        })?);

        let platforms = Arc::new(PlatformService::new(api.clone()));
        let settings = Arc::new(SettingsService::new(api.clone()));
        let seo = SeoService::new(storage, platforms.clone(), settings.clone(), config.clone());

        Ok(Self {
            auth: AuthService::new(api.clone()),
            users: UserService::new(api.clone()),
            applications: ApplicationService::new(api.clone()),
            downloads: DownloadService::new(api.clone()),
            subscriptions: SubscriptionService::new(api.clone()),
            server_status: ServerStatusService::new(api.clone()),
            web: WebService::new(api.clone()),
            platforms,
            settings,
            seo,
            config,
            api,
        })
    }
}

pub type SharedState = Arc<AppState>;
