use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "signatures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub request_id: i32,

    pub movement_id: Option<i32>,

    pub signer_name: String,

    pub signer_phone: Option<String>,

    /// Opaque client payload, usually a data URL of the drawn signature.
    #[sea_orm(column_type = "Text")]
    pub signature_data: String,

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
        belongs_to = "super::movements::Entity",
        from = "Column::MovementId",
        to = "super::movements::Column::Id"
    )]
    Movement,
}

impl ActiveModelBehavior for ActiveModel {}
