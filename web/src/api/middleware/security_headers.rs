//! Security headers for every response.
//!
//! The content security policy admits the AdSense and Google sign-in origins
//! the public pages load scripts and frames from.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' https://pagead2.googlesyndication.com https://accounts.google.com; \
    style-src 'self' 'unsafe-inline'; \
    img-src 'self' data: https:; \
    connect-src 'self'; \
    frame-src https://googleads.g.doubleclick.net https://tpc.googlesyndication.com https://accounts.google.com; \
    frame-ancestors 'none'; base-uri 'self'; form-action 'self'";

static HEADERS: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
];

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in HEADERS {
        // Handlers may set a stricter value of their own
        headers
            .entry(HeaderName::from_static(*name))
            .or_insert(HeaderValue::from_static(*value));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn build_response(path: &str) -> Response {
        let app = Router::new()
            .route("/page", get(|| async { "OK" }))
            .route(
                "/framed",
                get(|| async { ([("x-frame-options", "SAMEORIGIN")], "OK") }),
            )
            .layer(middleware::from_fn(security_headers_middleware));

        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_headers_added() {
        let resp = build_response("/page").await;
        assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
        let csp = resp
            .headers()
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains("pagead2.googlesyndication.com"));
    }

    #[tokio::test]
    async fn test_handler_value_kept() {
        let resp = build_response("/framed").await;
        assert_eq!(resp.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
    }
}
