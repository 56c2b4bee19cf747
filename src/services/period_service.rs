//! Domain service for operational periods.
//!
//! A base has at most one active period at a time.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Actor;
use crate::entities::operational_periods;

#[derive(Debug, Error)]
pub enum PeriodError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("שם התקופה הוא שדה חובה")]
    EmptyName,

    #[error("קיימת כבר תקופה פעילה לבסיס זה")]
    ActivePeriodExists,

    #[error("הבסיס לא נמצא")]
    BaseNotFound,

    #[error("התקופה לא נמצאה")]
    NotFound,

    #[error("התקופה כבר הסתיימה")]
    AlreadyEnded,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PeriodError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PeriodError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait PeriodService: Send + Sync {
    /// # Errors
    ///
    /// [`PeriodError::ActivePeriodExists`] when the base already has an active
    /// period.
    async fn create_period(
        &self,
        actor: &Actor,
        base_id: i32,
        name: &str,
        starts_at: Option<DateTime<Utc>>,
    ) -> Result<operational_periods::Model, PeriodError>;

    async fn end_period(
        &self,
        actor: &Actor,
        id: i32,
    ) -> Result<operational_periods::Model, PeriodError>;

    async fn list_periods(
        &self,
        base_id: Option<i32>,
    ) -> Result<Vec<operational_periods::Model>, PeriodError>;

    async fn active_period(
        &self,
        base_id: i32,
    ) -> Result<Option<operational_periods::Model>, PeriodError>;
}
