//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::{hash_password_blocking, verify_password};
use crate::domain::phone_digits;
use crate::entities::users;
use crate::services::auth_service::{AuthError, AuthService, SessionUser, UserProfile};

pub struct SeaOrmAuthService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

fn claims(user: &users::Model) -> SessionUser {
    SessionUser {
        user_id: user.id,
        name: user.name.clone(),
        role: user.role,
        department_id: user.department_id,
        base_id: user.base_id,
        must_change_password: user.must_change_password,
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, phone: &str, password: &str) -> Result<SessionUser, AuthError> {
        let phone = phone_digits(phone);
        if phone.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .users()
            .get_by_phone(&phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        if !self.store.users().verify_password(&user, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let mut active: users::ActiveModel = user.into();
        active.last_login_at = Set(Some(Utc::now()));
        let user = active.update(&self.store.conn).await?;

        info!(event = "login", user_id = user.id, role = %user.role, "User logged in");

        Ok(claims(&user))
    }

    async fn profile(&self, user_id: i32) -> Result<UserProfile, AuthError> {
        let user = self
            .store
            .users()
            .get(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserProfile {
            session: claims(&user),
            phone: user.phone,
            barcode: user.barcode,
            last_login_at: user.last_login_at,
        })
    }

    async fn current_claims(&self, user_id: i32) -> Result<SessionUser, AuthError> {
        let user = self
            .store
            .users()
            .get(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(claims(&user))
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<SessionUser, AuthError> {
        let security = self.config.read().await.security.clone();

        if new_password.chars().count() < security.min_password_length {
            return Err(AuthError::Validation(format!(
                "הסיסמה החדשה חייבת להכיל לפחות {} תווים",
                security.min_password_length
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "הסיסמה החדשה חייבת להיות שונה מהסיסמה הנוכחית".to_string(),
            ));
        }

        let user = self
            .store
            .users()
            .get(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&user.password_hash, current_password).await? {
            return Err(AuthError::Validation("הסיסמה הנוכחית שגויה".to_string()));
        }

        let new_hash = hash_password_blocking(new_password, &security).await?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.must_change_password = Set(false);
        active.updated_at = Set(Utc::now());
        let user = active.update(&self.store.conn).await?;

        info!(event = "password_changed", user_id = user.id, "Password changed");

        Ok(claims(&user))
    }
}
