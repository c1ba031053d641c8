//! Account type repository backed by SeaORM.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::account_type::{self, Entity as AccountTypeEntity};
use super::ports::{AccountTypeChanges, AccountTypeFilter, AccountTypeRepository};
use crate::domain::AccountType;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

pub struct AccountTypeStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> AccountTypeStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

fn apply_filter(
    query: Select<AccountTypeEntity>,
    filter: &AccountTypeFilter,
) -> Select<AccountTypeEntity> {
    match filter.is_active {
        Some(flag) => query.filter(account_type::Column::IsActive.eq(flag)),
        None => query,
    }
}

#[async_trait]
impl<'a, C: ConnectionTrait> AccountTypeRepository for AccountTypeStore<'a, C> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccountType>> {
        let result = AccountTypeEntity::find_by_id(id)
            .filter(account_type::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AccountType::from))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<AccountType>> {
        let result = AccountTypeEntity::find()
            .filter(account_type::Column::Code.eq(code))
            .filter(account_type::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AccountType::from))
    }

    async fn find_by_code_with_deleted(&self, code: &str) -> AppResult<Option<AccountType>> {
        let result = AccountTypeEntity::find()
            .filter(account_type::Column::Code.eq(code))
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AccountType::from))
    }

    async fn list(
        &self,
        filter: &AccountTypeFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<AccountType>, u64)> {
        let query = apply_filter(
            AccountTypeEntity::find().filter(account_type::Column::DeletedAt.is_null()),
            filter,
        );

        let total = query.clone().count(self.conn).await.map_err(AppError::from)?;
        let models = query
            .order_by_asc(account_type::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok((models.into_iter().map(AccountType::from).collect(), total))
    }

    async fn insert(&self, new_account_type: AccountType) -> AppResult<AccountType> {
        let model = account_type::ActiveModel::from(new_account_type)
            .insert(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(AccountType::from(model))
    }

    async fn update(&self, id: Uuid, changes: AccountTypeChanges) -> AppResult<AccountType> {
        let model = AccountTypeEntity::find_by_id(id)
            .filter(account_type::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        let mut active: account_type::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(AppError::from)?;
        Ok(AccountType::from(model))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let model = AccountTypeEntity::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        if model.deleted_at.is_some() {
            return Ok(());
        }

        let mut active: account_type::ActiveModel = model.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(self.conn).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool> {
        let count = AccountTypeEntity::find_by_id(id)
            .filter(account_type::Column::DeletedAt.is_null())
            .filter(account_type::Column::IsActive.eq(true))
            .count(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}
