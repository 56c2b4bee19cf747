use crate::entities::{item_units, operational_periods, prelude::*, requests};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_requests_status")
                    .table(Requests)
                    .col(requests::Column::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_requests_department_status")
                    .table(Requests)
                    .col(requests::Column::DepartmentId)
                    .col(requests::Column::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_units_type_serial")
                    .table(ItemUnits)
                    .col(item_units::Column::ItemTypeId)
                    .col(item_units::Column::SerialNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_operational_periods_base_active")
                    .table(OperationalPeriods)
                    .col(operational_periods::Column::BaseId)
                    .col(operational_periods::Column::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_requests_status",
            "idx_requests_department_status",
            "idx_item_units_type_serial",
            "idx_operational_periods_base_active",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
