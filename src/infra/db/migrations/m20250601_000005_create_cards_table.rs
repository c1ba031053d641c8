//! Migration: Create the cards table.
//!
//! The required account reference carries RESTRICT; the optional issuer
//! reference carries SET NULL (clear on delete).

use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_institutions_table::FinancialInstitutions;
use super::m20250601_000004_create_accounts_table::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Cards::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Cards::InstitutionId).uuid().null())
                    .col(ColumnDef::new(Cards::LastFourDigits).string().not_null())
                    .col(ColumnDef::new(Cards::CardType).string().not_null())
                    .col(ColumnDef::new(Cards::Expires).string().null())
                    .col(ColumnDef::new(Cards::Status).string().not_null())
                    .col(
                        ColumnDef::new(Cards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cards::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_account")
                            .from(Cards::Table, Cards::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_institution")
                            .from(Cards::Table, Cards::InstitutionId)
                            .to(FinancialInstitutions::Table, FinancialInstitutions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key: one card suffix per account
        manager
            .create_index(
                Index::create()
                    .name("idx_cards_account_last_four")
                    .table(Cards::Table)
                    .col(Cards::AccountId)
                    .col(Cards::LastFourDigits)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cards_deleted_at")
                    .table(Cards::Table)
                    .col(Cards::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Cards {
    Table,
    Id,
    AccountId,
    InstitutionId,
    LastFourDigits,
    CardType,
    Expires,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
