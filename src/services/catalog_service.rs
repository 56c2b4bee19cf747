//! Domain service for categories, item types and serialized units.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Actor, TrackingMode, UnitStatus};
use crate::entities::{categories, item_types, item_units};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("אין הרשאה לביצוע הפעולה")]
    Forbidden,

    #[error("המחלקה לא נמצאה")]
    DepartmentNotFound,

    #[error("הקטגוריה לא נמצאה")]
    CategoryNotFound,

    #[error("סוג הפריט לא נמצא")]
    ItemTypeNotFound,

    #[error("הפריט לא נמצא")]
    UnitNotFound,

    #[error("קטגוריה בשם זה כבר קיימת")]
    CategoryExists,

    #[error("מספר סידורי זה כבר קיים עבור סוג הפריט")]
    SerialExists,

    #[error("סוג הפריט אינו מנוהל לפי מספרים סידוריים")]
    NotSerialTracked,

    #[error("לא ניתן להקטין את הכמות מתחת ל-{on_loan} פריטים שנמצאים בהשאלה")]
    TotalBelowOnLoan { on_loan: i32 },

    #[error("ניתן לסמן פריט כבשימוש רק דרך מסירה")]
    InUseViaHandoverOnly,

    #[error("הפריט נמצא כרגע בהשאלה")]
    UnitOnLoan,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItemType {
    pub department_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub tracking: TrackingMode,
    /// Initial stock of a quantity-tracked type; ignored for serial types.
    #[serde(default)]
    pub total_quantity: i32,
    #[serde(default)]
    pub minimum_alert: i32,
    pub max_loan_days: Option<i32>,
    #[serde(default)]
    pub requires_double_approval: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemTypeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub total_quantity: Option<i32>,
    pub minimum_alert: Option<i32>,
    pub max_loan_days: Option<i32>,
    pub requires_double_approval: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockItem {
    pub item_type_id: i32,
    pub department_id: i32,
    pub name: String,
    pub available_quantity: i32,
    pub minimum_alert: i32,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_category(
        &self,
        actor: &Actor,
        name: &str,
    ) -> Result<categories::Model, CatalogError>;

    async fn list_categories(&self) -> Result<Vec<categories::Model>, CatalogError>;

    async fn create_item_type(
        &self,
        actor: &Actor,
        input: NewItemType,
    ) -> Result<item_types::Model, CatalogError>;

    /// Changing the total of a quantity type shifts the available count by
    /// the same delta.
    ///
    /// # Errors
    ///
    /// [`CatalogError::TotalBelowOnLoan`] when the new total is smaller than the
    /// quantity currently out on loan.
    async fn update_item_type(
        &self,
        actor: &Actor,
        id: i32,
        update: ItemTypeUpdate,
    ) -> Result<item_types::Model, CatalogError>;

    /// Deletes the type with its units, requests, movements, signatures and
    /// snapshots in one transaction.
    async fn delete_item_type(&self, actor: &Actor, id: i32) -> Result<(), CatalogError>;

    async fn get_item_type(&self, id: i32) -> Result<item_types::Model, CatalogError>;

    async fn list_item_types(
        &self,
        actor: &Actor,
        department_id: Option<i32>,
    ) -> Result<Vec<item_types::Model>, CatalogError>;

    async fn add_unit(
        &self,
        actor: &Actor,
        item_type_id: i32,
        serial_number: &str,
        notes: Option<String>,
    ) -> Result<item_units::Model, CatalogError>;

    /// # Errors
    ///
    /// [`CatalogError::InUseViaHandoverOnly`] for `in_use`, and
    /// [`CatalogError::UnitOnLoan`] while the unit is handed over.
    async fn set_unit_status(
        &self,
        actor: &Actor,
        unit_id: i32,
        status: UnitStatus,
        notes: Option<String>,
    ) -> Result<item_units::Model, CatalogError>;

    async fn list_units(&self, item_type_id: i32) -> Result<Vec<item_units::Model>, CatalogError>;

    /// Item types whose available quantity is below their alert threshold.
    async fn low_stock(&self, actor: &Actor) -> Result<Vec<LowStockItem>, CatalogError>;
}
