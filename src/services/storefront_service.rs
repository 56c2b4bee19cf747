//! Public quick-request storefront reached through a signed link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Urgency;
use crate::entities::{item_types, requests};
use crate::services::request_service::RequestError;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("הקישור אינו תקין")]
    InvalidToken,

    #[error("תוקף הקישור פג, יש להזדהות מחדש")]
    TokenExpired,

    #[error("המשתמש לא נמצא או שאינו פעיל")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for StorefrontError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for StorefrontError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Either field identifies the user; the phone wins when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Identify {
    pub phone: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontUser {
    pub id: i32,
    pub name: String,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontDepartment {
    pub id: i32,
    pub name: String,
    pub allow_immediate: bool,
    pub allow_scheduled: bool,
    pub items: Vec<item_types::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontCatalog {
    pub user: StorefrontUser,
    pub departments: Vec<StorefrontDepartment>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickRequest {
    pub item_type_id: i32,
    pub item_unit_id: Option<i32>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub urgency: Urgency,
    pub scheduled_pickup_at: Option<DateTime<Utc>>,
    pub scheduled_return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[async_trait::async_trait]
pub trait StorefrontService: Send + Sync {
    async fn issue_for_user(&self, user_id: i32) -> Result<IssuedToken, StorefrontError>;

    /// Looks up an active user by phone or barcode and issues a token.
    async fn identify(&self, input: Identify) -> Result<IssuedToken, StorefrontError>;

    /// Item types of the token user's home department and its store peers.
    async fn catalog(&self, token: &str) -> Result<StorefrontCatalog, StorefrontError>;

    /// Creates a submitted request for the token user.
    async fn quick_request(
        &self,
        token: &str,
        input: QuickRequest,
    ) -> Result<requests::Model, StorefrontError>;
}
