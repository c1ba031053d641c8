//! Account service.
//!
//! Cross-aggregate invariants are re-validated inside the same transaction
//! that performs the write: the referenced institution and account type must
//! exist and be active at insert time, not merely at request-validation
//! time. Ownership violations surface as NotFound so account existence is
//! never leaked to other users.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::CURRENCY_CODE_LENGTH;
use crate::domain::{Account, Actor};
use crate::errors::{AppError, AppResult};
use crate::infra::audit::{self, AuditEvent, AuditOutcome, AuditSink};
use crate::infra::repositories::{
    AccountChanges, AccountFilter, AccountRepository, AccountTypeRepository, CardRepository,
    InstitutionRepository, UserRepository,
};
use crate::infra::{retry, UnitOfWork};
use crate::types::PaginationParams;
use crate::with_transaction;

const AGGREGATE: &str = "account";

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Open an account for the acting user
    async fn create_account(
        &self,
        actor: &Actor,
        institution_id: Uuid,
        account_type_id: Uuid,
        name: String,
        currency: String,
    ) -> AppResult<Account>;

    /// Get an account; owner or admin, NotFound otherwise
    async fn get_account(&self, actor: &Actor, id: Uuid) -> AppResult<Account>;

    /// List accounts; non-admins see only their own
    async fn list_accounts(
        &self,
        actor: &Actor,
        filter: AccountFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Account>, u64)>;

    /// Update an account; owner or admin
    async fn update_account(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: AccountChanges,
    ) -> AppResult<Account>;

    /// Soft delete an account; RESTRICTed while active cards reference it
    async fn delete_account(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of AccountService using Unit of Work.
pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
    audit: Arc<dyn AuditSink>,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>, audit: Arc<dyn AuditSink>) -> Self {
        Self { uow, audit }
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn create_account(
        &self,
        actor: &Actor,
        institution_id: Uuid,
        account_type_id: Uuid,
        name: String,
        currency: String,
    ) -> AppResult<Account> {
        if currency.len() != CURRENCY_CODE_LENGTH
            || !currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(AppError::validation(
                "Currency must be a 3-letter ISO code, e.g. USD",
            ));
        }

        let new_account = Account::new(actor.id, institution_id, account_type_id, name, currency);
        let account_id = new_account.id;
        let actor_id = actor.id;

        let result = with_transaction!(self.uow, |ctx| {
            // Required references are re-validated in the same scope as the
            // insert so they cannot go stale between check and write.
            if !ctx.users().exists_and_active(actor_id).await? {
                return Err(AppError::validation("Owning user is not active"));
            }
            if !ctx
                .institutions()
                .exists_and_active(institution_id)
                .await?
            {
                return Err(AppError::validation(
                    "Referenced institution does not exist or is not active",
                ));
            }
            if !ctx
                .account_types()
                .exists_and_active(account_type_id)
                .await?
            {
                return Err(AppError::validation(
                    "Referenced account type does not exist or is not active",
                ));
            }
            if ctx
                .accounts()
                .find_by_user_and_name(new_account.user_id, &new_account.name)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(
                    "An account with this name already exists",
                ));
            }

            ctx.accounts().insert(new_account).await
        });

        let mut event = AuditEvent::new(
            actor.id,
            "account.create",
            AGGREGATE,
            account_id,
            AuditOutcome::from_result(&result),
        );
        if let Ok(ref account) = result {
            event = event.with_after(account);
        }
        audit::emit(self.audit.as_ref(), event).await;

        result
    }

    async fn get_account(&self, actor: &Actor, id: Uuid) -> AppResult<Account> {
        let account = retry::transient(|| async {
            with_transaction!(self.uow, |ctx| { ctx.accounts().find_by_id(id).await })
        })
        .await?
        .ok_or(AppError::NotFound)?;

        // Deliberate NotFound: existence must not leak across owners
        if !actor.owns_or_admin(account.user_id) {
            return Err(AppError::NotFound);
        }

        Ok(account)
    }

    async fn list_accounts(
        &self,
        actor: &Actor,
        filter: AccountFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Account>, u64)> {
        let mut filter = filter;
        // Non-admins are always scoped to their own accounts
        if !actor.is_admin() {
            filter.user_id = Some(actor.id);
        }

        retry::transient(|| async {
            let filter = filter.clone();
            let page = page.clone();
            with_transaction!(self.uow, |ctx| {
                ctx.accounts().list(&filter, &page).await
            })
        })
        .await
    }

    async fn update_account(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: AccountChanges,
    ) -> AppResult<Account> {
        let caller = actor.clone();
        let result = with_transaction!(self.uow, |ctx| {
            let before = ctx
                .accounts()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            if !caller.owns_or_admin(before.user_id) {
                return Err(AppError::NotFound);
            }
            if let Some(ref name) = changes.name {
                if before.name != *name
                    && ctx
                        .accounts()
                        .find_by_user_and_name(before.user_id, name)
                        .await?
                        .is_some()
                {
                    return Err(AppError::conflict(
                        "An account with this name already exists",
                    ));
                }
            }
            let after = ctx.accounts().update(id, changes).await?;
            Ok((before, after))
        });

        let mut event = AuditEvent::new(
            actor.id,
            "account.update",
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

    async fn delete_account(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let caller = actor.clone();
        let result = with_transaction!(self.uow, |ctx| {
            let account = ctx
                .accounts()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            if !caller.owns_or_admin(account.user_id) {
                return Err(AppError::NotFound);
            }

            // RESTRICT: live cards hold a required reference to the account
            if ctx.cards().count_active_by_account(id).await? > 0 {
                return Err(AppError::conflict(
                    "Account still has cards and cannot be deleted",
                ));
            }

            ctx.accounts().soft_delete(id).await
        });

        let event = AuditEvent::new(
            actor.id,
            "account.soft_delete",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        audit::emit(self.audit.as_ref(), event).await;

        result
    }
}
