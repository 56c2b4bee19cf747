//! Domain service for the loan request lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Actor, RequestStatus, UnitStatus, Urgency};
use crate::entities::{movements, requests, signatures};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("הבקשה לא נמצאה")]
    NotFound,

    #[error("סוג הפריט לא נמצא")]
    ItemTypeNotFound,

    #[error("הפריט לא נמצא")]
    UnitNotFound,

    #[error("לא ניתן להעביר בקשה מסטטוס {from} לסטטוס {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("{0}")]
    Validation(String),

    #[error("כמות לא תקינה")]
    InvalidQuantity,

    #[error("המחלקה אינה מאפשרת בקשות מיידיות")]
    ImmediateNotAllowed,

    #[error("המחלקה אינה מאפשרת בקשות מתוזמנות")]
    ScheduledNotAllowed,

    #[error("מועד האיסוף חייב להיות לפני מועד ההחזרה")]
    InvalidSchedule,

    #[error("משך ההשאלה המרבי לפריט זה הוא {0} ימים")]
    LoanTooLong(i32),

    #[error("הפריט אינו זמין")]
    UnitUnavailable,

    #[error("אין מספיק מלאי (זמינים: {available})")]
    InsufficientStock { available: i32 },

    #[error("נדרש אישור של מאשר נוסף")]
    SecondApproverRequired,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RequestError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RequestError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRequest {
    /// Managers may create a request on a soldier's behalf; soldiers always
    /// request for themselves.
    pub soldier_id: Option<i32>,
    pub item_type_id: i32,
    pub item_unit_id: Option<i32>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub urgency: Urgency,
    pub scheduled_pickup_at: Option<DateTime<Utc>>,
    pub scheduled_return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Create directly in `submitted` instead of `draft`.
    #[serde(default)]
    pub submit: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandoverInput {
    /// Required for serial types unless the request already names a unit.
    pub unit_id: Option<i32>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    /// Captured signature payload.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnInput {
    /// Condition of the returned equipment, `available` when absent.
    pub unit_condition: Option<UnitStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub department_id: Option<i32>,
    pub soldier_id: Option<i32>,
    pub item_type_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: requests::Model,
    pub movements: Vec<movements::Model>,
    pub signatures: Vec<signatures::Model>,
}

#[async_trait::async_trait]
pub trait RequestService: Send + Sync {
    /// # Errors
    ///
    /// Validation errors for quantity, urgency flags, schedule and loan length,
    /// [`RequestError::UnitUnavailable`] when the requested unit is not free.
    async fn create_request(
        &self,
        actor: &Actor,
        input: NewRequest,
    ) -> Result<requests::Model, RequestError>;

    async fn get_request(&self, actor: &Actor, id: i32) -> Result<RequestDetail, RequestError>;

    /// Soldiers see their own requests, department commanders their
    /// department's, HQ commanders and super admins everything.
    async fn list_requests(
        &self,
        actor: &Actor,
        filter: RequestFilter,
    ) -> Result<Vec<requests::Model>, RequestError>;

    /// `draft -> submitted`, continuing to `approved` for auto-approving
    /// departments unless the item type needs two approvals.
    async fn submit(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError>;

    /// For double-approval types the first call only records the approver.
    async fn approve(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError>;

    async fn reject(
        &self,
        actor: &Actor,
        id: i32,
        reason: &str,
    ) -> Result<requests::Model, RequestError>;

    async fn mark_ready(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError>;

    async fn handover(
        &self,
        actor: &Actor,
        id: i32,
        input: HandoverInput,
    ) -> Result<requests::Model, RequestError>;

    async fn return_request(
        &self,
        actor: &Actor,
        id: i32,
        input: ReturnInput,
    ) -> Result<requests::Model, RequestError>;

    /// Closing an overdue request writes the equipment off.
    async fn close(&self, actor: &Actor, id: i32) -> Result<requests::Model, RequestError>;

    /// Moves handed-over requests past their return date to `overdue`.
    async fn mark_overdue_sweep(&self, now: DateTime<Utc>) -> Result<u64, RequestError>;

    async fn list_movements(
        &self,
        actor: &Actor,
        request_id: i32,
    ) -> Result<Vec<movements::Model>, RequestError>;
}
