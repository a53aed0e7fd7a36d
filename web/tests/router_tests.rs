//! End-to-end tests of the router against a stub backend API.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};

use common::{
    body_bytes, body_json, form_request, location, with_session, FailingStorage, TestApp,
    ADMIN_ID, ADMIN_TOKEN, SITE_URL, USER_TOKEN,
};
use vidgrab_web::services::seo_service::{render_ads_txt, render_robots_txt};

#[tokio::test]
async fn test_bulk_delete_with_no_ids_never_reaches_backend() {
    let app = TestApp::new().await;

    let request = with_session(Method::POST, "/platform/bulk", ADMIN_TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"ids":[]}"#))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No ids provided");
    assert_eq!(app.hits.count_prefix("POST /platforms/bulk-delete"), 0);
}

#[tokio::test]
async fn test_application_bulk_delete_rejects_missing_or_malformed_ids() {
    let app = TestApp::new().await;

    for body in [r#"{"ids":[]}"#, r#"{}"#, "not json"] {
        let request = with_session(Method::POST, "/application/bulk", ADMIN_TOKEN)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.send(request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(!json["message"].as_str().unwrap_or_default().is_empty());
    }
    assert_eq!(app.hits.count_prefix("POST /applications/bulk-delete"), 0);
}

#[tokio::test]
async fn test_bulk_delete_reports_count() {
    let app = TestApp::new().await;

    let request = with_session(Method::POST, "/download/bulk", ADMIN_TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"ids":["d1","d2"]}"#))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "2 downloads deleted successfully");
    assert!(app.hits.contains("POST /downloads/bulk-delete"));
}

#[tokio::test]
async fn test_delete_download_for_signed_in_user() {
    let app = TestApp::new().await;

    let request = with_session(Method::DELETE, "/download/task-42", USER_TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Download deleted successfully");
    assert!(app.hits.contains("DELETE /downloads/task-42"));
}

#[tokio::test]
async fn test_backend_failure_is_reported_in_envelope() {
    let app = TestApp::new().await;

    let request = with_session(Method::DELETE, "/user/u-2", ADMIN_TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User has active downloads");
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;

    let request = with_session(Method::DELETE, &format!("/user/{}", ADMIN_ID), ADMIN_TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.hits.count_prefix("DELETE /users/"), 0);
}

#[tokio::test]
async fn test_invalid_settings_form_is_echoed_back() {
    let app = TestApp::new().await;

    let request = form_request(
        "/admin/settings/website",
        Some(ADMIN_TOKEN),
        "site_name=&site_description=Fast+downloads&default_language=en",
    );
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["form"]["site_description"], "Fast downloads");
    assert_eq!(body["message"], "Site name is required");
    assert!(!app.hits.contains("PUT /settings/bulk"));
}

#[tokio::test]
async fn test_valid_settings_form_redirects() {
    let app = TestApp::new().await;

    let request = form_request(
        "/admin/settings/website",
        Some(ADMIN_TOKEN),
        "site_name=VidGrab&site_description=Fast+downloads&default_language=en",
    );
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/settings");
    assert!(app.hits.contains("PUT /settings/bulk"));
}

#[tokio::test]
async fn test_seo_artifacts_generated_once() {
    let app = TestApp::new().await;

    for (path, rendered) in [
        ("/ads.txt", render_ads_txt(SITE_URL, None)),
        ("/robots.txt", render_robots_txt(SITE_URL)),
    ] {
        let first = app
            .send(Request::get(path).body(Body::empty()).unwrap())
            .await;
        assert_eq!(first.status(), StatusCode::OK, "{path}");
        assert_eq!(body_bytes(first).await, rendered.as_bytes(), "{path}");

        let stored = app.static_dir.path().join(path.trim_start_matches('/'));
        assert_eq!(std::fs::read_to_string(&stored).unwrap(), rendered, "{path}");

        // Later requests serve the stored file, not a fresh rendering
        std::fs::write(&stored, "# edited by operator\n").unwrap();
        let second = app
            .send(Request::get(path).body(Body::empty()).unwrap())
            .await;
        assert_eq!(second.status(), StatusCode::OK, "{path}");
        assert_eq!(body_bytes(second).await, "# edited by operator\n".as_bytes(), "{path}");
    }
}

#[tokio::test]
async fn test_seo_artifact_served_with_500_when_storage_fails() {
    let app = TestApp::with_storage(Arc::new(FailingStorage)).await;

    let response = app
        .send(Request::get("/robots.txt").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        body_bytes(response).await,
        render_robots_txt(SITE_URL).as_bytes()
    );
}

#[tokio::test]
async fn test_unsupported_locale_sitemap_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::get("/xx/sitemap.xml").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_visitor_redirected_to_login() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::get("/account").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with("/login?redirect_to="));
}

#[tokio::test]
async fn test_non_admin_redirected_home() {
    let app = TestApp::new().await;

    let request = with_session(Method::GET, "/admin/users", USER_TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_rejected_session_is_cleared() {
    let app = TestApp::new().await;

    let request = with_session(Method::GET, "/account", "expired")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new().await;

    let request = form_request("/login", None, "email=ann%40example.com&password=secret123");
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("session=fresh-token"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_home_page_degrades_without_platforms() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::get("/api/pages/home").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["platforms"], serde_json::json!([]));
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-content-type-options"));
    assert!(response.headers().contains_key("x-correlation-id"));
}
