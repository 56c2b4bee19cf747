use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::MovementKind;

/// Immutable record of a physical transfer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub request_id: Option<i32>,

    pub item_type_id: i32,

    pub item_unit_id: Option<i32>,

    pub quantity: i32,

    pub kind: MovementKind,

    pub from_user_id: Option<i32>,

    pub to_user_id: Option<i32>,

    pub executed_by: Option<i32>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requests::Entity",
        from = "Column::RequestId",
        to = "super::requests::Column::Id"
    )]
    Request,
    #[sea_orm(
        belongs_to = "super::item_types::Entity",
        from = "Column::ItemTypeId",
        to = "super::item_types::Column::Id"
    )]
    ItemType,
}

impl ActiveModelBehavior for ActiveModel {}
