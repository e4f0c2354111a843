//! Migration to create the schedules table
//!
//! A schedule is the tenant-owned container of the jobs of one transaction request.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(pk_auto(Schedules::Id))
                    .col(uuid_uniq(Schedules::Uuid))
                    .col(string(Schedules::TenantId).not_null())
                    .col(timestamp_with_time_zone(Schedules::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedules_tenant_id")
                    .table(Schedules::Table)
                    .col(Schedules::TenantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Schedules {
    Table,
    Id,
    Uuid,
    TenantId,
    CreatedAt,
}
