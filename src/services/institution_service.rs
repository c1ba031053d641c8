//! Financial institution service.
//!
//! Writes are admin-scoped. Removal is RESTRICTed while active accounts
//! hold a required reference; cards holding the optional issuer reference
//! have it cleared in the same transaction and survive.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Actor, FinancialInstitution};
use crate::errors::{AppError, AppResult};
use crate::infra::audit::{self, AuditEvent, AuditOutcome, AuditSink};
use crate::infra::repositories::{
    AccountRepository, CardRepository, InstitutionChanges, InstitutionFilter,
    InstitutionRepository,
};
use crate::infra::{retry, UnitOfWork};
use crate::types::PaginationParams;
use crate::with_transaction;

const AGGREGATE: &str = "financial_institution";

/// Institution service trait for dependency injection.
#[async_trait]
pub trait InstitutionService: Send + Sync {
    /// Create an institution; admin only
    async fn create_institution(
        &self,
        actor: &Actor,
        code: String,
        name: String,
        website: Option<String>,
    ) -> AppResult<FinancialInstitution>;

    /// Get an institution by id
    async fn get_institution(&self, id: Uuid) -> AppResult<FinancialInstitution>;

    /// Get an institution by its unique code
    async fn get_institution_by_code(&self, code: &str) -> AppResult<FinancialInstitution>;

    /// List institutions
    async fn list_institutions(
        &self,
        filter: InstitutionFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<FinancialInstitution>, u64)>;

    /// Update an institution; admin only
    async fn update_institution(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: InstitutionChanges,
    ) -> AppResult<FinancialInstitution>;

    /// Soft delete an institution; admin only. RESTRICTed while active
    /// accounts reference it; optional card references are cleared.
    async fn delete_institution(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of InstitutionService using Unit of Work.
pub struct InstitutionManager<U: UnitOfWork> {
    uow: Arc<U>,
    audit: Arc<dyn AuditSink>,
}

impl<U: UnitOfWork> InstitutionManager<U> {
    pub fn new(uow: Arc<U>, audit: Arc<dyn AuditSink>) -> Self {
        Self { uow, audit }
    }
}

#[async_trait]
impl<U: UnitOfWork> InstitutionService for InstitutionManager<U> {
    async fn create_institution(
        &self,
        actor: &Actor,
        code: String,
        name: String,
        website: Option<String>,
    ) -> AppResult<FinancialInstitution> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let new_institution = FinancialInstitution::new(code, name, website);
        let institution_id = new_institution.id;

        let result = with_transaction!(self.uow, |ctx| {
            // Soft-deleted institutions keep their code reserved; the unique
            // index backstops a concurrent create racing this check.
            if ctx
                .institutions()
                .find_by_code_with_deleted(&new_institution.code)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(
                    "An institution with this code already exists",
                ));
            }
            ctx.institutions().insert(new_institution).await
        });

        let mut event = AuditEvent::new(
            actor.id,
            "institution.create",
            AGGREGATE,
            institution_id,
            AuditOutcome::from_result(&result),
        );
        if let Ok(ref institution) = result {
            event = event.with_after(institution);
        }
        audit::emit(self.audit.as_ref(), event).await;

        result
    }

    async fn get_institution(&self, id: Uuid) -> AppResult<FinancialInstitution> {
        retry::transient(|| async {
            with_transaction!(self.uow, |ctx| { ctx.institutions().find_by_id(id).await })
        })
        .await?
        .ok_or(AppError::NotFound)
    }

    async fn get_institution_by_code(&self, code: &str) -> AppResult<FinancialInstitution> {
        retry::transient(|| async {
            let code = code.to_string();
            with_transaction!(self.uow, |ctx| {
                ctx.institutions().find_by_code(&code).await
            })
        })
        .await?
        .ok_or(AppError::NotFound)
    }

    async fn list_institutions(
        &self,
        filter: InstitutionFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<FinancialInstitution>, u64)> {
        retry::transient(|| async {
            let filter = filter.clone();
            let page = page.clone();
            with_transaction!(self.uow, |ctx| {
                ctx.institutions().list(&filter, &page).await
            })
        })
        .await
    }

    async fn update_institution(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: InstitutionChanges,
    ) -> AppResult<FinancialInstitution> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| {
            let before = ctx
                .institutions()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            let after = ctx.institutions().update(id, changes).await?;
            Ok((before, after))
        });

        let mut event = AuditEvent::new(
            actor.id,
            "institution.update",
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

    async fn delete_institution(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| {
            // RESTRICT: accounts hold a required reference
            if ctx.accounts().count_active_by_institution(id).await? > 0 {
                return Err(AppError::conflict(
                    "Institution is still referenced by accounts and cannot be deleted",
                ));
            }

            // Clear-on-delete: the optional issuer reference on cards is
            // nulled in the same scope; the cards survive.
            let cleared = ctx.cards().clear_institution(id).await?;
            if cleared > 0 {
                tracing::debug!(institution_id = %id, cleared, "Cleared card issuer references");
            }

            ctx.institutions().soft_delete(id).await
        });

        let event = AuditEvent::new(
            actor.id,
            "institution.soft_delete",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        audit::emit(self.audit.as_ref(), event).await;

        result
    }
}
