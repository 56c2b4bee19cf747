//! Bootstrap, destructive reset and the role-shaped dashboard.

use serde::Serialize;
use thiserror::Error;

use crate::db::seed::SeedReport;
use crate::domain::{Actor, Role};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("משפט האישור או קוד האישור שגויים")]
    ConfirmationMismatch,

    #[error("אירעה שגיאה באיפוס המערכת")]
    ResetFailed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SystemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Counters shown on the landing page. Manager-only figures are `None` for
/// soldiers.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub role: Role,
    pub my_open_requests: u64,
    pub my_active_loans: u64,
    pub pending_approvals: Option<u64>,
    pub ready_for_pickup: Option<u64>,
    pub on_loan: Option<u64>,
    pub overdue: Option<u64>,
    pub low_stock: Option<u64>,
}

#[async_trait::async_trait]
pub trait SystemService: Send + Sync {
    /// Wipes every table and re-seeds the defaults. Both confirmation values
    /// must match the configured literals exactly.
    async fn reset_system(
        &self,
        actor: &Actor,
        phrase: &str,
        code: &str,
    ) -> Result<SeedReport, SystemError>;

    /// Seeds the defaults when no user exists yet.
    async fn ensure_seeded(&self) -> Result<Option<SeedReport>, SystemError>;

    async fn dashboard(&self, actor: &Actor) -> Result<Dashboard, SystemError>;

    /// Database round trip used by the readiness probe.
    async fn ready(&self) -> Result<(), SystemError>;
}
