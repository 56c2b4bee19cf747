use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::domain::AuditAction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Empty for actions taken by the CLI or scheduler.
    pub user_id: Option<i32>,

    pub action: AuditAction,

    pub entity_type: String,

    pub entity_id: Option<i32>,

    pub old_values: Option<Json>,

    pub new_values: Option<Json>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
