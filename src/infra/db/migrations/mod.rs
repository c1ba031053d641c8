//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users_table;
mod m20250601_000002_create_institutions_table;
mod m20250601_000003_create_account_types_table;
mod m20250601_000004_create_accounts_table;
mod m20250601_000005_create_cards_table;
mod m20250601_000006_create_audit_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users_table::Migration),
            Box::new(m20250601_000002_create_institutions_table::Migration),
            Box::new(m20250601_000003_create_account_types_table::Migration),
            Box::new(m20250601_000004_create_accounts_table::Migration),
            Box::new(m20250601_000005_create_cards_table::Migration),
            Box::new(m20250601_000006_create_audit_log_table::Migration),
        ]
    }
}
