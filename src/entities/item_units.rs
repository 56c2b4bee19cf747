use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::UnitStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "item_units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub item_type_id: i32,

    pub serial_number: String,

    pub status: UnitStatus,

    pub notes: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item_types::Entity",
        from = "Column::ItemTypeId",
        to = "super::item_types::Column::Id"
    )]
    ItemType,
}

impl Related<super::item_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
