//! Migration: Create the account_types table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountTypes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountTypes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AccountTypes::Name).string().not_null())
                    .col(ColumnDef::new(AccountTypes::Description).string().null())
                    .col(ColumnDef::new(AccountTypes::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(AccountTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountTypes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountTypes::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_account_types_deleted_at")
                    .table(AccountTypes::Table)
                    .col(AccountTypes::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountTypes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum AccountTypes {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
