//! Common test utilities for router integration tests
//!
//! - A stub backend API served on an ephemeral port that records every call
//! - Application setup against that backend with a temporary static directory
//! - Request and body helpers

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tempfile::TempDir;

use vidgrab_web::api::{routes::create_router, AppState};
use vidgrab_web::storage::filesystem::FilesystemStorage;
use vidgrab_web::storage::StorageBackend;
use vidgrab_web::{AppError, Config};

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADMIN_ID: &str = "admin-1";
pub const SITE_URL: &str = "https://vidgrab.test";

/// Calls received by the stub backend, as `"METHOD /path"`.
#[derive(Clone, Default)]
pub struct Hits(Arc<Mutex<Vec<String>>>);

impl Hits {
    fn record(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.all().iter().any(|c| c == call)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.all().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Application under test plus the stub backend it talks to
pub struct TestApp {
    pub router: Router,
    pub hits: Hits,
    pub static_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// App whose static artifacts go to `storage` instead of the temp directory.
    pub async fn with_storage(storage: Arc<dyn StorageBackend>) -> Self {
        Self::build(Some(storage)).await
    }

    async fn build(storage: Option<Arc<dyn StorageBackend>>) -> Self {
        let hits = Hits::default();
        let backend = Router::new().fallback(stub_backend).with_state(hits.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });

        let static_dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_backend(
            format!("http://{}", addr),
            static_dir.path().to_string_lossy().to_string(),
        );
        config.supported_locales = vec!["en".into(), "fr".into()];
        config.site_url = SITE_URL.into();

        let storage = storage
            .unwrap_or_else(|| Arc::new(FilesystemStorage::new(config.static_dir.clone())));
        let state = Arc::new(AppState::with_storage(config, storage).unwrap());
        Self {
            router: create_router(state),
            hits,
            static_dir,
        }
    }

    pub async fn send(&self, request: Request) -> Response {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Storage that never finds anything and fails every write.
pub struct FailingStorage;

#[async_trait]
impl StorageBackend for FailingStorage {
    async fn put(&self, key: &str, _content: Bytes) -> vidgrab_web::Result<()> {
        Err(AppError::Storage(format!("read-only volume: {}", key)))
    }

    async fn get(&self, key: &str) -> vidgrab_web::Result<Bytes> {
        Err(AppError::Storage(format!("missing: {}", key)))
    }

    async fn exists(&self, _key: &str) -> vidgrab_web::Result<bool> {
        Ok(false)
    }

    async fn delete(&self, _key: &str) -> vidgrab_web::Result<()> {
        Ok(())
    }
}

fn user_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": "Test User",
        "email": format!("{}@example.com", id),
        "role": role,
        "is_active": true,
    })
}

fn bearer(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

/// Minimal backend: enough routes for the flows the tests exercise.
async fn stub_backend(State(hits): State<Hits>, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    hits.record(format!("{} {}", method, path));

    let ok = || Json(json!({ "success": true })).into_response();

    match (method, path.as_str()) {
        (Method::GET, "/health") => ok(),
        (Method::GET, "/auth/me") => match bearer(&req).as_deref() {
            Some(USER_TOKEN) => Json(json!({ "success": true, "data": user_json("u-1", "user") }))
                .into_response(),
            Some(ADMIN_TOKEN) => Json(json!({ "success": true, "data": user_json(ADMIN_ID, "admin") }))
                .into_response(),
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "Invalid token" })),
            )
                .into_response(),
        },
        (Method::POST, "/auth/login") => Json(json!({
            "success": true,
            "data": { "token": "fresh-token", "user": user_json("u-1", "user") },
        }))
        .into_response(),
        (Method::GET, "/settings") => Json(json!({ "success": true, "data": [] })).into_response(),
        (Method::PUT, "/settings/bulk") => ok(),
        (Method::GET, "/platforms") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "database unavailable" })),
        )
            .into_response(),
        (Method::DELETE, p) if p.starts_with("/downloads/") => ok(),
        (Method::POST, p) if p.ends_with("/bulk-delete") => ok(),
        (Method::DELETE, p) if p.starts_with("/users/") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "message": "User has active downloads" })),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Not found" })),
        )
            .into_response(),
    }
}

/// Request carrying the session cookie for `token`.
pub fn with_session(method: Method, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("session={}", token))
}

pub fn form_request(uri: &str, token: Option<&str>, body: &str) -> Request {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("session={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_bytes(response: Response) -> bytes::Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
