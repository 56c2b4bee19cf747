use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::TrackingMode;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "item_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub department_id: i32,

    pub category_id: Option<i32>,

    pub name: String,

    pub description: Option<String>,

    pub tracking: TrackingMode,

    /// For serial types: number of units that are not destroyed.
    pub total_quantity: i32,

    pub available_quantity: i32,

    pub minimum_alert: i32,

    pub max_loan_days: Option<i32>,

    pub requires_double_approval: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::item_units::Entity")]
    Units,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::item_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
