//! `SeaORM` implementation of the `StorefrontService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::db::Store;
use crate::domain::{Actor, phone_digits};
use crate::entities::{requests, users};
use crate::services::request_service::{NewRequest, RequestService};
use crate::services::storefront_service::{
    Identify, IssuedToken, QuickRequest, StorefrontCatalog, StorefrontDepartment,
    StorefrontError, StorefrontService, StorefrontUser,
};
use crate::storefront::{self, TokenError};

pub struct SeaOrmStorefrontService {
    store: Store,
    config: Arc<RwLock<Config>>,
    requests: Arc<dyn RequestService>,
}

impl SeaOrmStorefrontService {
    #[must_use]
    pub fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        requests: Arc<dyn RequestService>,
    ) -> Self {
        Self {
            store,
            config,
            requests,
        }
    }

    async fn active_user(&self, user_id: i32) -> Result<users::Model, StorefrontError> {
        self.store
            .users()
            .get(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(StorefrontError::UserNotFound)
    }

    async fn issue(&self, user: &users::Model) -> Result<IssuedToken, StorefrontError> {
        let (secret, ttl_minutes) = {
            let config = self.config.read().await;
            (
                signing_secret(&config)?,
                config.storefront.token_ttl_minutes,
            )
        };

        let expires_at = Utc::now() + chrono::Duration::minutes(i64::from(ttl_minutes));
        let token = storefront::issue(secret.as_bytes(), user.id, expires_at.timestamp_millis())
            .map_err(|e| StorefrontError::Internal(e.to_string()))?;

        info!(event = "storefront_token_issued", user_id = user.id, "Storefront token issued");

        Ok(IssuedToken { token, expires_at })
    }

    /// Resolves a token to its still-active user.
    async fn token_user(&self, token: &str) -> Result<users::Model, StorefrontError> {
        let secret = signing_secret(&*self.config.read().await)?;

        let user_id = storefront::verify(secret.as_bytes(), token, Utc::now().timestamp_millis())
            .map_err(|e| {
                debug!(error = %e, "Rejected storefront token");
                match e {
                    TokenError::Expired => StorefrontError::TokenExpired,
                    TokenError::InvalidKey => StorefrontError::Internal(e.to_string()),
                    TokenError::Malformed | TokenError::BadSignature => {
                        StorefrontError::InvalidToken
                    }
                }
            })?;

        self.active_user(user_id).await
    }
}

fn signing_secret(config: &Config) -> Result<String, StorefrontError> {
    config
        .storefront
        .token_secret
        .clone()
        .ok_or_else(|| StorefrontError::Internal("storefront.token_secret is not set".to_string()))
}

fn actor_for(user: &users::Model) -> Actor {
    Actor {
        user_id: Some(user.id),
        role: user.role,
        department_id: user.department_id,
        base_id: user.base_id,
    }
}

#[async_trait]
impl StorefrontService for SeaOrmStorefrontService {
    async fn issue_for_user(&self, user_id: i32) -> Result<IssuedToken, StorefrontError> {
        let user = self.active_user(user_id).await?;
        self.issue(&user).await
    }

    async fn identify(&self, input: Identify) -> Result<IssuedToken, StorefrontError> {
        let phone = input
            .phone
            .map(|p| phone_digits(&p))
            .filter(|p| !p.is_empty());
        let barcode = input
            .barcode
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        let user = match (phone, barcode) {
            (Some(phone), _) => self.store.users().get_by_phone(&phone).await?,
            (None, Some(barcode)) => self.store.users().get_by_barcode(&barcode).await?,
            (None, None) => {
                return Err(StorefrontError::Validation(
                    "יש להזין מספר טלפון או ברקוד".to_string(),
                ));
            }
        };

        let user = user
            .filter(|u| u.is_active)
            .ok_or(StorefrontError::UserNotFound)?;
        self.issue(&user).await
    }

    async fn catalog(&self, token: &str) -> Result<StorefrontCatalog, StorefrontError> {
        let user = self.token_user(token).await?;
        let department_ids = self
            .store
            .org()
            .borrowable_departments(user.id, user.department_id)
            .await?;

        let mut departments = Vec::with_capacity(department_ids.len());
        for id in department_ids {
            let Some(department) = self.store.org().get_department(id).await? else {
                continue;
            };
            let items = self.store.catalog().list_item_types(Some(&[id])).await?;
            departments.push(StorefrontDepartment {
                id: department.id,
                name: department.name,
                allow_immediate: department.allow_immediate,
                allow_scheduled: department.allow_scheduled,
                items,
            });
        }

        Ok(StorefrontCatalog {
            user: StorefrontUser {
                id: user.id,
                name: user.name,
                department_id: user.department_id,
            },
            departments,
        })
    }

    async fn quick_request(
        &self,
        token: &str,
        input: QuickRequest,
    ) -> Result<requests::Model, StorefrontError> {
        let user = self.token_user(token).await?;
        let actor = actor_for(&user);

        let request = self
            .requests
            .create_request(
                &actor,
                NewRequest {
                    soldier_id: Some(user.id),
                    item_type_id: input.item_type_id,
                    item_unit_id: input.item_unit_id,
                    quantity: input.quantity,
                    urgency: input.urgency,
                    scheduled_pickup_at: input.scheduled_pickup_at,
                    scheduled_return_at: input.scheduled_return_at,
                    notes: input.notes,
                    submit: true,
                },
            )
            .await?;

        Ok(request)
    }
}

