//! Domain service for user provisioning and lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Actor, Role};
use crate::entities::users;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("המשתמש לא נמצא")]
    NotFound,

    #[error("מספר הטלפון כבר קיים במערכת")]
    PhoneTaken,

    #[error("הברקוד כבר משויך למשתמש אחר")]
    BarcodeTaken,

    #[error("לא ניתן להשבית את המשתמש שלך")]
    CannotDeactivateSelf,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub base_id: Option<i32>,
    pub barcode: Option<String>,
    /// Extra departments a soldier may borrow from.
    #[serde(default)]
    pub department_ids: Vec<i32>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub department_id: Option<i32>,
    /// An empty string clears the barcode.
    pub barcode: Option<String>,
    pub department_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub department_id: Option<i32>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub base_id: Option<i32>,
    pub barcode: Option<String>,
    pub is_active: bool,
    pub must_change_password: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub department_ids: Vec<i32>,
}

impl UserDto {
    #[must_use]
    pub fn from_model(model: users::Model, department_ids: Vec<i32>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            role: model.role,
            department_id: model.department_id,
            base_id: model.base_id,
            barcode: model.barcode,
            is_active: model.is_active,
            must_change_password: model.must_change_password,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            department_ids,
        }
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user whose initial password is their phone digits.
    ///
    /// # Errors
    ///
    /// [`UserError::PhoneTaken`] and [`UserError::BarcodeTaken`] on collisions,
    /// [`UserError::Forbidden`] when the actor may not create this role.
    async fn create_user(&self, actor: &Actor, input: NewUser) -> Result<UserDto, UserError>;

    async fn update_user(
        &self,
        actor: &Actor,
        id: i32,
        update: UserUpdate,
    ) -> Result<UserDto, UserError>;

    async fn toggle_user_active(&self, actor: &Actor, id: i32) -> Result<UserDto, UserError>;

    async fn reset_user_password(&self, actor: &Actor, id: i32) -> Result<UserDto, UserError>;

    async fn get_user(&self, actor: &Actor, id: i32) -> Result<UserDto, UserError>;

    async fn list_users(&self, actor: &Actor, filter: UserFilter)
    -> Result<Vec<UserDto>, UserError>;
}
