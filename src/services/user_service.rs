//! User service - user management use cases.
//!
//! Ownership rules: a user may read and update themselves; role changes,
//! listing, restore and access to other users require the admin role.
//! Deleting a user is RESTRICTed while active accounts reference them.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Actor, User};
use crate::errors::{AppError, AppResult};
use crate::infra::audit::{self, AuditEvent, AuditOutcome, AuditSink};
use crate::infra::repositories::{AccountRepository, UserChanges, UserRepository};
use crate::infra::{retry, UnitOfWork};
use crate::types::PaginationParams;
use crate::with_transaction;

const AGGREGATE: &str = "user";

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user; self or admin
    async fn get_user(&self, actor: &Actor, id: Uuid) -> AppResult<User>;

    /// Get a user including soft-deleted; admin only
    async fn get_user_with_deleted(&self, actor: &Actor, id: Uuid) -> AppResult<User>;

    /// List active users; admin only
    async fn list_users(
        &self,
        actor: &Actor,
        page: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)>;

    /// Update name (self or admin) and role (admin only)
    async fn update_user(&self, actor: &Actor, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Soft delete a user; fails while active accounts reference them
    async fn delete_user(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user; admin only
    async fn restore_user(&self, actor: &Actor, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    audit: Arc<dyn AuditSink>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, audit: Arc<dyn AuditSink>) -> Self {
        Self { uow, audit }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        if !actor.owns_or_admin(id) {
            return Err(AppError::Forbidden);
        }

        retry::transient(|| async {
            with_transaction!(self.uow, |ctx| { ctx.users().find_by_id(id).await })
        })
        .await?
        .ok_or(AppError::NotFound)
    }

    async fn get_user_with_deleted(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        retry::transient(|| async {
            with_transaction!(self.uow, |ctx| {
                ctx.users().find_by_id_with_deleted(id).await
            })
        })
        .await?
        .ok_or(AppError::NotFound)
    }

    async fn list_users(
        &self,
        actor: &Actor,
        page: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        retry::transient(|| async {
            let page = page.clone();
            with_transaction!(self.uow, |ctx| { ctx.users().list(&page).await })
        })
        .await
    }

    async fn update_user(&self, actor: &Actor, id: Uuid, changes: UserChanges) -> AppResult<User> {
        if !actor.owns_or_admin(id) {
            return Err(AppError::Forbidden);
        }
        if changes.role.is_some() && !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| {
            let before = ctx
                .users()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            let after = ctx.users().update(id, changes).await?;
            Ok((before, after))
        });

        let mut event = AuditEvent::new(
            actor.id,
            "user.update",
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

    async fn delete_user(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        if !actor.owns_or_admin(id) {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| {
            // RESTRICT: re-checked inside the same scope that flips the flag
            if ctx.accounts().count_active_by_user(id).await? > 0 {
                return Err(AppError::conflict(
                    "User still owns accounts and cannot be deleted",
                ));
            }
            ctx.users().soft_delete(id).await
        });

        let event = AuditEvent::new(
            actor.id,
            "user.soft_delete",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        audit::emit(self.audit.as_ref(), event).await;

        result
    }

    async fn restore_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let result = with_transaction!(self.uow, |ctx| { ctx.users().restore(id).await });

        let mut event = AuditEvent::new(
            actor.id,
            "user.restore",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        if let Ok(ref user) = result {
            event = event.with_after(user);
        }
        audit::emit(self.audit.as_ref(), event).await;

        result
    }
}
