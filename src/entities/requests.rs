use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::{RequestStatus, Urgency};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub soldier_id: i32,

    pub department_id: i32,

    pub item_type_id: i32,

    pub item_unit_id: Option<i32>,

    pub quantity: i32,

    pub urgency: Urgency,

    pub status: RequestStatus,

    pub scheduled_pickup_at: Option<DateTimeUtc>,

    pub scheduled_return_at: Option<DateTimeUtc>,

    pub notes: Option<String>,

    pub recipient_name: Option<String>,

    pub recipient_phone: Option<String>,

    /// Set when the first of two required approvals is given.
    pub first_approved_by: Option<i32>,

    pub approved_by: Option<i32>,

    pub rejected_reason: Option<String>,

    pub handed_over_at: Option<DateTimeUtc>,

    pub returned_at: Option<DateTimeUtc>,

    pub created_by: Option<i32>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SoldierId",
        to = "super::users::Column::Id"
    )]
    Soldier,
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::item_types::Entity",
        from = "Column::ItemTypeId",
        to = "super::item_types::Column::Id"
    )]
    ItemType,
    #[sea_orm(
        belongs_to = "super::item_units::Entity",
        from = "Column::ItemUnitId",
        to = "super::item_units::Column::Id"
    )]
    ItemUnit,
}

impl Related<super::item_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
