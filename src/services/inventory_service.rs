//! Reconciliation of stock counters and periodic snapshots.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Actor;
use crate::entities::inventory_snapshots;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("סוג הפריט לא נמצא")]
    ItemTypeNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for InventoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Item types examined.
    pub checked: u64,
    /// Units and item types that had to be corrected.
    pub fixed: u64,
}

#[async_trait::async_trait]
pub trait InventoryService: Send + Sync {
    /// Recomputes stock counters from units and open loans. `None` syncs every
    /// item type the actor manages.
    async fn sync_inventory(
        &self,
        actor: &Actor,
        item_type_id: Option<i32>,
    ) -> Result<SyncReport, InventoryError>;

    /// Records one snapshot per item type and returns how many were written.
    async fn take_snapshot(&self) -> Result<u64, InventoryError>;

    async fn list_snapshots(
        &self,
        actor: &Actor,
        item_type_id: Option<i32>,
    ) -> Result<Vec<inventory_snapshots::Model>, InventoryError>;
}
