//! Domain service for authentication and route access.
//!
//! Handles phone/password login, password changes and the route guard
//! decision applied by the HTTP middleware.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Actor, Role};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("מספר טלפון או סיסמה שגויים")]
    InvalidCredentials,

    #[error("החשבון אינו פעיל")]
    AccountDisabled,

    #[error("המשתמש לא נמצא")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Claims stored in the session under the `"user"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i32,
    pub name: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub base_id: Option<i32>,
    pub must_change_password: bool,
}

impl SessionUser {
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            user_id: Some(self.user_id),
            role: self.role,
            department_id: self.department_id,
            base_id: self.base_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub session: SessionUser,
    pub phone: String,
    pub barcode: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RequireLogin,
    Forbidden,
    RequirePasswordChange,
}

/// Routes a user with a pending password change may still reach.
const PASSWORD_CHANGE_ROUTES: &[&str] = &["/auth/password", "/auth/logout", "/auth/me"];

/// Decides whether `path` (with or without the `/api` prefix) may be served.
#[must_use]
pub fn decide_route(user: Option<&SessionUser>, path: &str) -> RouteDecision {
    let Some(user) = user else {
        return RouteDecision::RequireLogin;
    };

    let path = path.strip_prefix("/api").unwrap_or(path);
    let path = path.trim_end_matches('/');

    if user.must_change_password && !PASSWORD_CHANGE_ROUTES.contains(&path) {
        return RouteDecision::RequirePasswordChange;
    }

    if (path == "/admin" || path.starts_with("/admin/")) && !user.role.is_admin() {
        return RouteDecision::Forbidden;
    }

    RouteDecision::Allow
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies a phone/password pair and returns the session claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown phone or a wrong
    /// password, and [`AuthError::AccountDisabled`] for inactive users.
    async fn login(&self, phone: &str, password: &str) -> Result<SessionUser, AuthError>;

    async fn profile(&self, user_id: i32) -> Result<UserProfile, AuthError>;

    /// Re-reads the claims for a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] if the row is gone and
    /// [`AuthError::AccountDisabled`] if the user was deactivated.
    async fn current_claims(&self, user_id: i32) -> Result<SessionUser, AuthError>;

    /// Changes a user's password and clears the forced-change flag.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong or the
    /// new one is too short or unchanged.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<SessionUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, must_change_password: bool) -> SessionUser {
        SessionUser {
            user_id: 1,
            name: "test".to_string(),
            role,
            department_id: Some(1),
            base_id: Some(1),
            must_change_password,
        }
    }

    #[test]
    fn test_anonymous_requires_login() {
        assert_eq!(decide_route(None, "/api/dashboard"), RouteDecision::RequireLogin);
        assert_eq!(decide_route(None, "/admin/users"), RouteDecision::RequireLogin);
    }

    #[test]
    fn test_admin_routes_by_role() {
        for role in [Role::SuperAdmin, Role::HqCommander] {
            assert_eq!(
                decide_route(Some(&user(role, false)), "/api/admin/users"),
                RouteDecision::Allow
            );
        }
        for role in [Role::DeptCommander, Role::Soldier] {
            assert_eq!(
                decide_route(Some(&user(role, false)), "/admin/users/3"),
                RouteDecision::Forbidden
            );
            assert_eq!(
                decide_route(Some(&user(role, false)), "/requests"),
                RouteDecision::Allow
            );
        }
    }

    #[test]
    fn test_admin_prefix_is_not_substring_match() {
        let soldier = user(Role::Soldier, false);
        assert_eq!(
            decide_route(Some(&soldier), "/administrators"),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_password_change_forced_everywhere_else() {
        let admin = user(Role::SuperAdmin, true);
        assert_eq!(
            decide_route(Some(&admin), "/api/admin/users"),
            RouteDecision::RequirePasswordChange
        );
        assert_eq!(
            decide_route(Some(&admin), "/dashboard"),
            RouteDecision::RequirePasswordChange
        );
        assert_eq!(
            decide_route(Some(&admin), "/api/auth/password"),
            RouteDecision::Allow
        );
        assert_eq!(decide_route(Some(&admin), "/auth/me/"), RouteDecision::Allow);
        assert_eq!(decide_route(Some(&admin), "/auth/logout"), RouteDecision::Allow);
    }
}
