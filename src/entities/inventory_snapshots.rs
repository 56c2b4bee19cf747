use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inventory_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub item_type_id: i32,

    pub department_id: i32,

    pub total_quantity: i32,

    pub available_quantity: i32,

    /// Quantity out on open loans at the time of the snapshot.
    pub on_loan_quantity: i32,

    pub taken_at: DateTimeUtc,
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

impl ActiveModelBehavior for ActiveModel {}
