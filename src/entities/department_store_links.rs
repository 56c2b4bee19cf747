use sea_orm::entity::prelude::*;

/// `department_id` may also show the items of `store_department_id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "department_store_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub department_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub store_department_id: i32,
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
        belongs_to = "super::departments::Entity",
        from = "Column::StoreDepartmentId",
        to = "super::departments::Column::Id"
    )]
    StoreDepartment,
}

impl ActiveModelBehavior for ActiveModel {}
