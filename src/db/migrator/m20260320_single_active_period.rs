use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_operational_periods_base_active")
            .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_operational_periods_one_active \
             ON operational_periods(base_id) WHERE is_active = 1",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_operational_periods_one_active")
            .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_operational_periods_base_active \
             ON operational_periods(base_id, is_active)",
        )
        .await?;

        Ok(())
    }
}
