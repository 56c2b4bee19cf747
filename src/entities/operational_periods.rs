use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "operational_periods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub base_id: i32,

    pub name: String,

    pub starts_at: DateTimeUtc,

    pub ends_at: Option<DateTimeUtc>,

    /// At most one active period per base.
    pub is_active: bool,

    pub created_by: Option<i32>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bases::Entity",
        from = "Column::BaseId",
        to = "super::bases::Column::Id"
    )]
    Base,
}

impl ActiveModelBehavior for ActiveModel {}
