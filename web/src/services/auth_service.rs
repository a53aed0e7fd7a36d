//! Authentication against the backend: login, OAuth, password flows.

use serde::{de::IgnoredAny, Serialize};
use std::sync::Arc;

use super::api_client::ApiClient;
use super::{RequestContext, ServiceResult};
use crate::models::user::{Session, User};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct GoogleCredential<'a> {
    credential: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordReset<'a> {
    token: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Exchange email and password for a session
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> ServiceResult<Session> {
        self.client
            .post(ctx, "/auth/login", &Credentials { email, password }, true)
            .await
    }

    /// Exchange a Google ID token for a session
    pub async fn google_login(&self, ctx: &RequestContext, credential: &str) -> ServiceResult<Session> {
        self.client
            .post(ctx, "/auth/google", &GoogleCredential { credential }, true)
            .await
    }

    pub async fn register(
        &self,
        ctx: &RequestContext,
        name: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<Session> {
        self.client
            .post(
                ctx,
                "/auth/register",
                &Registration {
                    name,
                    email,
                    password,
                },
                true,
            )
            .await
    }

    /// Ask the backend to email a reset link
    pub async fn forgot_password(&self, ctx: &RequestContext, email: &str) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/auth/forgot-password", &EmailOnly { email }, true)
            .await
            .map(|_| ())
    }

    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        token: &str,
        password: &str,
    ) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(
                ctx,
                "/auth/reset-password",
                &PasswordReset { token, password },
                true,
            )
            .await
            .map(|_| ())
    }

    /// Change the signed-in user's password
    pub async fn update_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        self.client
            .put::<IgnoredAny, _>(
                ctx,
                "/auth/password",
                &PasswordChange {
                    current_password,
                    new_password,
                },
            )
            .await
            .map(|_| ())
    }

    /// Resolve the session token to its user
    pub async fn current_user(&self, ctx: &RequestContext) -> ServiceResult<User> {
        self.client.get(ctx, "/auth/me", false).await
    }

    /// Invalidate the session token on the backend
    pub async fn logout(&self, ctx: &RequestContext) -> ServiceResult<()> {
        self.client
            .post::<IgnoredAny, _>(ctx, "/auth/logout", &serde_json::json!({}), false)
            .await
            .map(|_| ())
    }
}
