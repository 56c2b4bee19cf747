use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub base_id: i32,

    pub name: String,

    /// Soldiers may ask for same-day pickup.
    pub allow_immediate: bool,

    /// Soldiers may book a future pickup window.
    pub allow_scheduled: bool,

    /// Submitted requests skip the manual approval step.
    pub auto_approve_requests: bool,

    pub is_hq: bool,

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

impl Related<super::bases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Base.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
