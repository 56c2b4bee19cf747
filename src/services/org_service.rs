//! Domain service for bases and departments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Actor;
use crate::entities::{bases, departments};

#[derive(Debug, Error)]
pub enum OrgError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("הבסיס לא נמצא")]
    BaseNotFound,

    #[error("המחלקה לא נמצאה")]
    DepartmentNotFound,

    #[error("מחלקת אחסון לא תקינה: {0}")]
    InvalidStorePeer(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for OrgError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OrgError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBase {
    pub name: String,
    pub commander_name: Option<String>,
    pub commander_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub base_id: i32,
    pub name: String,
    #[serde(default = "default_true")]
    pub allow_immediate: bool,
    #[serde(default = "default_true")]
    pub allow_scheduled: bool,
    #[serde(default)]
    pub auto_approve_requests: bool,
    #[serde(default)]
    pub is_hq: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub allow_immediate: Option<bool>,
    pub allow_scheduled: Option<bool>,
    pub auto_approve_requests: Option<bool>,
    /// Replaces the store-peer list when present.
    pub store_department_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentDto {
    #[serde(flatten)]
    pub department: departments::Model,
    pub store_department_ids: Vec<i32>,
}

#[async_trait::async_trait]
pub trait OrgService: Send + Sync {
    async fn create_base(&self, actor: &Actor, input: NewBase) -> Result<bases::Model, OrgError>;

    async fn list_bases(&self) -> Result<Vec<bases::Model>, OrgError>;

    async fn create_department(
        &self,
        actor: &Actor,
        input: NewDepartment,
    ) -> Result<DepartmentDto, OrgError>;

    /// Applies flag changes and, when given, swaps the store-peer list in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// [`OrgError::InvalidStorePeer`] when a peer is the department itself or
    /// belongs to another base.
    async fn update_department(
        &self,
        actor: &Actor,
        id: i32,
        update: DepartmentUpdate,
    ) -> Result<DepartmentDto, OrgError>;

    async fn get_department(&self, id: i32) -> Result<DepartmentDto, OrgError>;

    async fn list_departments(&self, base_id: Option<i32>)
    -> Result<Vec<DepartmentDto>, OrgError>;
}
