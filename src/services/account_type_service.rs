//! Account type service.
//!
//! Writes are admin-scoped. Removal is RESTRICTed while active accounts
//! hold a required reference to the type.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AccountType, Actor};
use crate::errors::{AppError, AppResult};
use crate::infra::audit::{self, AuditEvent, AuditOutcome, AuditSink};
use crate::infra::repositories::{
    AccountRepository, AccountTypeChanges, AccountTypeFilter, AccountTypeRepository,
};
use crate::infra::{retry, UnitOfWork};
use crate::types::PaginationParams;
use crate::with_transaction;

const AGGREGATE: &str = "account_type";

/// Account type service trait for dependency injection.
#[async_trait]
pub trait AccountTypeService: Send + Sync {
    /// Create an account type; admin only
    async fn create_account_type(
        &self,
        actor: &Actor,
        code: String,
        name: String,
        description: Option<String>,
    ) -> AppResult<AccountType>;

    /// Get an account type by id
    async fn get_account_type(&self, id: Uuid) -> AppResult<AccountType>;

    /// List account types
    async fn list_account_types(
        &self,
        filter: AccountTypeFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<AccountType>, u64)>;

    /// Update an account type; admin only
    async fn update_account_type(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: AccountTypeChanges,
    ) -> AppResult<AccountType>;

    /// Soft delete an account type; admin only, RESTRICTed while accounts
    /// use it
    async fn delete_account_type(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of AccountTypeService using Unit of Work.
pub struct AccountTypeManager<U: UnitOfWork> {
    uow: Arc<U>,
    audit: Arc<dyn AuditSink>,
}

impl<U: UnitOfWork> AccountTypeManager<U> {
    pub fn new(uow: Arc<U>, audit: Arc<dyn AuditSink>) -> Self {
        Self { uow, audit }
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountTypeService for AccountTypeManager<U> {
    async fn create_account_type(
        &self,
        actor: &Actor,
        code: String,
        name: String,
        description: Option<String>,
    ) -> AppResult<AccountType> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let new_account_type = AccountType::new(code, name, description);
        let account_type_id = new_account_type.id;

        let result = with_transaction!(self.uow, |ctx| {
            if ctx
                .account_types()
                .find_by_code_with_deleted(&new_account_type.code)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(
                    "An account type with this code already exists",
                ));
            }
            ctx.account_types().insert(new_account_type).await
        });

        let mut event = AuditEvent::new(
            actor.id,
            "account_type.create",
            AGGREGATE,
            account_type_id,
            AuditOutcome::from_result(&result),
        );
        if let Ok(ref account_type) = result {
            event = event.with_after(account_type);
        }
        audit::emit(self.audit.as_ref(), event).await;

        result
    }

    async fn get_account_type(&self, id: Uuid) -> AppResult<AccountType> {
        retry::transient(|| async {
            with_transaction!(self.uow, |ctx| {
                ctx.account_types().find_by_id(id).await
            })
        })
        .await?
        .ok_or(AppError::NotFound)
    }

    async fn list_account_types(
        &self,
        filter: AccountTypeFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<AccountType>, u64)> {
        retry::transient(|| async {
            let filter = filter.clone();
            let page = page.clone();
            with_transaction!(self.uow, |ctx| {
                ctx.account_types().list(&filter, &page).await
            })
        })
        .await
    }

    async fn update_account_type(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: AccountTypeChanges,
    ) -> AppResult<AccountType> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| {
            let before = ctx
                .account_types()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            let after = ctx.account_types().update(id, changes).await?;
            Ok((before, after))
        });

        let mut event = AuditEvent::new(
            actor.id,
            "account_type.update",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        if let Ok((ref before, ref after)) = result {
            event = event.with_before(before).with_after(after);
        }
        audit::emit(self.audit.as_ref(), event).await;

        result.map(|(_, after)| after)
    }

    async fn delete_account_type(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| {
            if ctx.accounts().count_active_by_account_type(id).await? > 0 {
                return Err(AppError::conflict(
                    "Account type is still used by accounts and cannot be deleted",
                ));
            }
            ctx.account_types().soft_delete(id).await
        });

        let event = AuditEvent::new(
            actor.id,
            "account_type.soft_delete",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        audit::emit(self.audit.as_ref(), event).await;

        result
    }
}
