//! Migration to create the logs table
//!
//! Append-only. The autoincrement id orders the status history of a job.

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000003_create_jobs::Jobs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Logs::Table)
                    .if_not_exists()
                    .col(pk_auto(Logs::Id))
                    .col(integer(Logs::JobId).not_null())
                    .col(string(Logs::Status).not_null())
                    .col(text(Logs::Message).default(""))
                    .col(timestamp_with_time_zone(Logs::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_logs_job_id")
                            .from(Logs::Table, Logs::JobId)
                            .to(Jobs::Table, Jobs::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_logs_job_id")
                    .table(Logs::Table)
                    .col(Logs::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Logs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Logs {
    Table,
    Id,
    JobId,
    Status,
    Message,
    CreatedAt,
}
