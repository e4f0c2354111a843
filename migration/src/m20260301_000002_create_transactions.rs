//! Migration to create the transactions table
//!
//! One row per job; updated in place as the job progresses (nonce, gas, hash).

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(string_null(Transactions::Hash))
                    .col(string_null(Transactions::Sender))
                    .col(string_null(Transactions::Recipient))
                    .col(string_null(Transactions::Nonce))
                    .col(string_null(Transactions::Value))
                    .col(string_null(Transactions::GasPrice))
                    .col(string_null(Transactions::GasFeeCap))
                    .col(string_null(Transactions::GasTipCap))
                    .col(string_null(Transactions::Gas))
                    .col(text_null(Transactions::Data))
                    .col(text_null(Transactions::Raw))
                    .col(string_null(Transactions::TxType))
                    .col(string_null(Transactions::PrivateFrom))
                    .col(json_null(Transactions::PrivateFor))
                    .col(string_null(Transactions::PrivacyGroupId))
                    .col(string_null(Transactions::EnclaveKey))
                    .col(timestamp_with_time_zone(Transactions::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Transactions::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Lookup by on-chain hash (job search by tx hashes)
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_hash")
                    .table(Transactions::Table)
                    .col(Transactions::Hash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Transactions {
    Table,
    Id,
    Hash,
    Sender,
    Recipient,
    Nonce,
    Value,
    GasPrice,
    GasFeeCap,
    GasTipCap,
    Gas,
    Data,
    Raw,
    TxType,
    PrivateFrom,
    PrivateFor,
    PrivacyGroupId,
    EnclaveKey,
    CreatedAt,
    UpdatedAt,
}
