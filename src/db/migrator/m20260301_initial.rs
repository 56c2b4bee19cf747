use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve.
        create(manager, &schema, Bases).await?;
        create(manager, &schema, Departments).await?;
        create(manager, &schema, DepartmentStoreLinks).await?;
        create(manager, &schema, Users).await?;
        create(manager, &schema, SoldierDepartments).await?;
        create(manager, &schema, Categories).await?;
        create(manager, &schema, ItemTypes).await?;
        create(manager, &schema, ItemUnits).await?;
        create(manager, &schema, Requests).await?;
        create(manager, &schema, Movements).await?;
        create(manager, &schema, Signatures).await?;
        create(manager, &schema, OperationalPeriods).await?;
        create(manager, &schema, AuditLogs).await?;
        create(manager, &schema, InventorySnapshots).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventorySnapshots).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLogs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OperationalPeriods).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Signatures).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movements).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Requests).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemUnits).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemTypes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SoldierDepartments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DepartmentStoreLinks).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bases).to_owned())
            .await?;

        Ok(())
    }
}
