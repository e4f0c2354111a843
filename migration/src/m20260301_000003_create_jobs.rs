//! Migration to create the jobs table
//!
//! Job status is not a column: it is derived from the logs table.

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000001_create_schedules::Schedules;
use crate::m20260301_000002_create_transactions::Transactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(pk_auto(Jobs::Id))
                    .col(uuid_uniq(Jobs::Uuid))
                    .col(integer(Jobs::ScheduleId).not_null())
                    .col(integer(Jobs::TransactionId).not_null())
                    .col(uuid(Jobs::ChainUuid))
                    .col(string(Jobs::JobType).not_null())
                    .col(uuid_null(Jobs::NextJobUuid))
                    .col(uuid_null(Jobs::ParentJobUuid))
                    .col(boolean(Jobs::IsParent).default(true))
                    .col(json(Jobs::Labels))
                    .col(json(Jobs::InternalData))
                    .col(timestamp_with_time_zone(Jobs::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Jobs::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_schedule_id")
                            .from(Jobs::Table, Jobs::ScheduleId)
                            .to(Schedules::Table, Schedules::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_transaction_id")
                            .from(Jobs::Table, Jobs::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Lineage lookups (sibling reconciliation, retry sessions)
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_parent_job_uuid")
                    .table(Jobs::Table)
                    .col(Jobs::ParentJobUuid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_schedule_id")
                    .table(Jobs::Table)
                    .col(Jobs::ScheduleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Jobs {
    Table,
    Id,
    Uuid,
    ScheduleId,
    TransactionId,
    ChainUuid,
    JobType,
    NextJobUuid,
    ParentJobUuid,
    IsParent,
    Labels,
    InternalData,
    CreatedAt,
    UpdatedAt,
}
