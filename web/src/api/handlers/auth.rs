//! Authentication form actions.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    routing::post,
    Json, Router,
};

use super::{see_other, ActionResult};
use crate::api::dto::ApiResponse;
use crate::api::forms::{
    FormBody, ForgotPasswordForm, GoogleLoginForm, LoginForm, RegisterForm, ResetPasswordForm,
    Validate,
};
use crate::api::middleware::auth::{clear_session_cookie, login_redirect, with_cookie};
use crate::api::SharedState;
use crate::services::RequestContext;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/login/google", post(google_login))
        .route("/register", post(register))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/logout", post(logout))
}

/// Sign in with email and password
pub async fn login(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<LoginForm>,
) -> ActionResult {
    form.check()?;
    let session = state.auth.login(&ctx, form.email.trim(), &form.password).await?;
    tracing::info!(user_id = %session.user.id, "User signed in");
    Ok(login_redirect(
        &state.config,
        &session.token,
        form.redirect_to.as_deref(),
    ))
}

/// Sign in with a Google ID token
pub async fn google_login(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<GoogleLoginForm>,
) -> ActionResult {
    form.check()?;
    let session = state.auth.google_login(&ctx, form.credential.trim()).await?;
    tracing::info!(user_id = %session.user.id, "User signed in with Google");
    Ok(login_redirect(
        &state.config,
        &session.token,
        form.redirect_to.as_deref(),
    ))
}

pub async fn register(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<RegisterForm>,
) -> ActionResult {
    form.check()?;
    let session = state
        .auth
        .register(&ctx, form.name.trim(), form.email.trim(), &form.password)
        .await?;
    tracing::info!(user_id = %session.user.id, "User registered");
    Ok(login_redirect(
        &state.config,
        &session.token,
        form.redirect_to.as_deref(),
    ))
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<ForgotPasswordForm>,
) -> ActionResult {
    form.check()?;
    state.auth.forgot_password(&ctx, form.email.trim()).await?;
    Ok(Json(ApiResponse::ok(
        "If an account exists for that email, a reset link is on its way",
    ))
    .into_response())
}

pub async fn reset_password(
    State(state): State<SharedState>,
    ctx: RequestContext,
    FormBody(form): FormBody<ResetPasswordForm>,
) -> ActionResult {
    form.check()?;
    state
        .auth
        .reset_password(&ctx, form.token.trim(), &form.password)
        .await?;
    see_other("/login")
}

/// Drop the session. A backend failure does not keep the user signed in.
pub async fn logout(State(state): State<SharedState>, ctx: RequestContext) -> ActionResult {
    if ctx.is_authenticated() {
        if let Err(e) = state.auth.logout(&ctx).await {
            tracing::warn!("Backend logout failed, clearing cookie anyway: {}", e);
        }
    }
    Ok(with_cookie(
        Redirect::to("/").into_response(),
        clear_session_cookie(&state.config),
    ))
}
