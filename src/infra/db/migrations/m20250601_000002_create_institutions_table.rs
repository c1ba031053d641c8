//! Migration: Create the financial_institutions table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FinancialInstitutions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialInstitutions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialInstitutions::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialInstitutions::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FinancialInstitutions::Website).string().null())
                    .col(
                        ColumnDef::new(FinancialInstitutions::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialInstitutions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialInstitutions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialInstitutions::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financial_institutions_deleted_at")
                    .table(FinancialInstitutions::Table)
                    .col(FinancialInstitutions::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialInstitutions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum FinancialInstitutions {
    Table,
    Id,
    Code,
    Name,
    Website,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
