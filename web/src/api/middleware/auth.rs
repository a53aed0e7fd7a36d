//! Session handling: request context extraction, route guards, and the
//! session cookie.
//!
//! The session token comes from the session cookie or, for API callers,
//! `Authorization: Bearer <token>`. Guards resolve the user through the
//! backend on every request; nothing is cached server-side.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use cookie::{time::Duration, Cookie, SameSite};

use crate::api::SharedState;
use crate::config::Config;
use crate::error::AppError;
use crate::models::user::User;
use crate::services::{with_query, RequestContext};

/// Cookie holding the visitor's chosen locale
pub const LOCALE_COOKIE: &str = "locale";

/// The signed-in user, inserted by [`require_user`] and [`require_admin`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw.to_string()))
        .filter_map(|c| c.ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// First supported language tag in an `Accept-Language` header, by weight.
fn preferred_language(config: &Config, header: &str) -> Option<String> {
    let mut tags: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next()?.trim().to_ascii_lowercase();
            let weight = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            (!tag.is_empty()).then_some((tag, weight))
        })
        .collect();
    tags.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    tags.into_iter().find_map(|(tag, _)| {
        let primary = tag.split('-').next().unwrap_or(&tag).to_string();
        config.is_supported_locale(&primary).then_some(primary)
    })
}

/// Build the per-request context from headers.
pub fn context_from_headers(config: &Config, headers: &HeaderMap) -> RequestContext {
    let token = cookie_value(headers, &config.session_cookie_name).or_else(|| bearer_token(headers));

    let locale = cookie_value(headers, LOCALE_COOKIE)
        .filter(|l| config.is_supported_locale(l))
        .or_else(|| {
            headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| preferred_language(config, h))
        })
        .unwrap_or_else(|| config.default_locale.clone());

    RequestContext::new(token, locale)
}

#[async_trait]
impl FromRequestParts<SharedState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> std::result::Result<Self, Self::Rejection> {
        // Guards store the context they resolved; reuse it
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(ctx.clone());
        }
        Ok(context_from_headers(&state.config, &parts.headers))
    }
}

/// Session cookie for a freshly issued token.
pub fn session_cookie(config: &Config, token: &str) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::days(config.session_max_age_days))
        .build()
}

/// Expired session cookie that makes the browser drop the session.
pub fn clear_session_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Attach a `Set-Cookie` header to a response.
pub fn with_cookie(mut response: Response, cookie: Cookie<'_>) -> Response {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Failed to encode session cookie: {}", e),
    }
    response
}

/// 302 Found; used by the guards.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/"))]).into_response(),
    }
}

/// Only same-site paths are honoured as post-login targets.
pub fn safe_redirect_target(target: Option<&str>) -> Option<&str> {
    target
        .map(str::trim)
        .filter(|t| t.starts_with('/') && !t.starts_with("//") && !t.contains('\\'))
}

/// POST-redirect-GET after a successful login or registration.
pub fn login_redirect(config: &Config, token: &str, redirect_to: Option<&str>) -> Response {
    let target = safe_redirect_target(redirect_to).unwrap_or("/account");
    with_cookie(Redirect::to(target).into_response(), session_cookie(config, token))
}

fn login_location(request: &Request) -> String {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    with_query("/login", &[("redirect_to", target)])
}

enum Resolved {
    User(RequestContext, User),
    Reject(Response),
}

/// Look the session up on the backend. Rejected or inactive sessions are
/// sent to `login` with the cookie cleared.
async fn resolve_user(state: &SharedState, ctx: RequestContext, login: String) -> Resolved {
    if !ctx.is_authenticated() {
        return Resolved::Reject(found(&login));
    }

    match state.auth.current_user(&ctx).await {
        Ok(user) if user.is_active => Resolved::User(ctx, user),
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Inactive account tried to sign in");
            Resolved::Reject(with_cookie(found(&login), clear_session_cookie(&state.config)))
        }
        Err(e) if e.is_unauthorized() => {
            tracing::debug!("Session rejected: {}", e);
            Resolved::Reject(with_cookie(found(&login), clear_session_cookie(&state.config)))
        }
        Err(e) => Resolved::Reject(AppError::from(e).into_response()),
    }
}

/// Requires a signed-in user; anonymous visitors are sent to the login page.
pub async fn require_user(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = context_from_headers(&state.config, request.headers());
    let login = login_location(&request);

    match resolve_user(&state, ctx, login).await {
        Resolved::User(ctx, user) => {
            request.extensions_mut().insert(ctx);
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Resolved::Reject(response) => response,
    }
}

/// Requires an admin; signed-in non-admins are sent home.
pub async fn require_admin(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = context_from_headers(&state.config, request.headers());
    let login = login_location(&request);

    match resolve_user(&state, ctx, login).await {
        Resolved::User(_, user) if !user.is_admin() => {
            tracing::warn!(user_id = %user.id, path = %request.uri().path(), "Non-admin blocked");
            found("/")
        }
        Resolved::User(ctx, user) => {
            request.extensions_mut().insert(ctx);
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Resolved::Reject(response) => response,
    }
}
