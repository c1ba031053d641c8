//! Account repository backed by SeaORM.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::account::{self, Entity as AccountEntity};
use super::ports::{AccountChanges, AccountFilter, AccountRepository};
use crate::domain::money;
use crate::domain::{Account, AccountStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

pub struct AccountStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> AccountStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

fn apply_filter(query: Select<AccountEntity>, filter: &AccountFilter) -> Select<AccountEntity> {
    let mut query = query;
    if let Some(user_id) = filter.user_id {
        query = query.filter(account::Column::UserId.eq(user_id));
    }
    if let Some(institution_id) = filter.institution_id {
        query = query.filter(account::Column::InstitutionId.eq(institution_id));
    }
    if let Some(account_type_id) = filter.account_type_id {
        query = query.filter(account::Column::AccountTypeId.eq(account_type_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(account::Column::Status.eq(status.to_string()));
    }
    query
}

#[async_trait]
impl<'a, C: ConnectionTrait> AccountRepository for AccountStore<'a, C> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .filter(account::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_user_and_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::UserId.eq(user_id))
            .filter(account::Column::Name.eq(name))
            .filter(account::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn list(
        &self,
        filter: &AccountFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Account>, u64)> {
        let query = apply_filter(
            AccountEntity::find().filter(account::Column::DeletedAt.is_null()),
            filter,
        );

        let total = query.clone().count(self.conn).await.map_err(AppError::from)?;
        let models = query
            .order_by_asc(account::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok((models.into_iter().map(Account::from).collect(), total))
    }

    async fn insert(&self, new_account: Account) -> AppResult<Account> {
        let model = account::ActiveModel::try_from(new_account)?
            .insert(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(Account::from(model))
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> AppResult<Account> {
        let model = AccountEntity::find_by_id(id)
            .filter(account::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        let mut active: account::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.to_string());
        }
        if let Some(balance) = changes.balance {
            active.balance_minor = Set(money::to_minor_units(balance)?);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(AppError::from)?;
        Ok(Account::from(model))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let model = AccountEntity::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        if model.deleted_at.is_some() {
            return Ok(());
        }

        let mut active: account::ActiveModel = model.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(self.conn).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool> {
        let count = AccountEntity::find_by_id(id)
            .filter(account::Column::DeletedAt.is_null())
            .filter(account::Column::Status.eq(AccountStatus::ACTIVE))
            .count(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn count_active_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        AccountEntity::find()
            .filter(account::Column::UserId.eq(user_id))
            .filter(account::Column::DeletedAt.is_null())
            .count(self.conn)
            .await
            .map_err(AppError::from)
    }

    async fn count_active_by_institution(&self, institution_id: Uuid) -> AppResult<u64> {
        AccountEntity::find()
            .filter(account::Column::InstitutionId.eq(institution_id))
            .filter(account::Column::DeletedAt.is_null())
            .count(self.conn)
            .await
            .map_err(AppError::from)
    }

    async fn count_active_by_account_type(&self, account_type_id: Uuid) -> AppResult<u64> {
        AccountEntity::find()
            .filter(account::Column::AccountTypeId.eq(account_type_id))
            .filter(account::Column::DeletedAt.is_null())
            .count(self.conn)
            .await
            .map_err(AppError::from)
    }
}
