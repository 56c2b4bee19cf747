use sea_orm::entity::prelude::*;

use crate::domain::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Digits only; the login identifier.
    #[sea_orm(unique)]
    pub phone: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub role: Role,

    pub department_id: Option<i32>,

    pub base_id: Option<i32>,

    /// Forces password rotation on first login and after an admin reset.
    pub must_change_password: bool,

    #[sea_orm(unique)]
    pub barcode: Option<String>,

    pub is_active: bool,

    pub last_login_at: Option<DateTimeUtc>,

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
        belongs_to = "super::bases::Entity",
        from = "Column::BaseId",
        to = "super::bases::Column::Id"
    )]
    Base,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
