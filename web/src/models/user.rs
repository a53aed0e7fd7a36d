//! User model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// User record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Token issued by the backend at login, cleared at logout.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

redacted_debug!(Session {
    redact token,
    show user,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults_when_fields_missing() {
        let user: User =
            serde_json::from_str(r#"{"id":"u1","name":"Ann","email":"ann@example.com"}"#).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
        assert!(!user.is_admin());
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_admin_role_parses_lowercase() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","name":"Root","email":"root@example.com","role":"admin"}"#,
        )
        .unwrap();
        assert!(user.is_admin());
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session {
            token: "jwt-abc".into(),
            user: User {
                id: "1".into(),
                name: "A".into(),
                email: "a@b.c".into(),
                role: Role::User,
                avatar: None,
                email_verified: false,
                is_active: true,
                created_at: None,
            },
        };
        assert!(!format!("{:?}", session).contains("jwt-abc"));
    }
}
