//! Card service.
//!
//! A card requires an active account owned by the acting user and may
//! optionally reference an issuing institution. Both references are
//! re-validated inside the transaction that writes the card.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::CARD_LAST_FOUR_LENGTH;
use crate::domain::{Actor, Card, CardType};
use crate::errors::{AppError, AppResult};
use crate::infra::audit::{self, AuditEvent, AuditOutcome, AuditSink};
use crate::infra::repositories::{
    AccountRepository, CardChanges, CardFilter, CardRepository, InstitutionRepository,
};
use crate::infra::{retry, UnitOfWork};
use crate::types::PaginationParams;
use crate::with_transaction;

const AGGREGATE: &str = "card";

/// Card service trait for dependency injection.
#[async_trait]
pub trait CardService: Send + Sync {
    /// Issue a card against an account owned by the actor
    async fn create_card(
        &self,
        actor: &Actor,
        account_id: Uuid,
        institution_id: Option<Uuid>,
        last_four_digits: String,
        card_type: CardType,
        expires: Option<String>,
    ) -> AppResult<Card>;

    /// Get a card; owner or admin, NotFound otherwise
    async fn get_card(&self, actor: &Actor, id: Uuid) -> AppResult<Card>;

    /// List cards; non-admins must scope the listing to one of their
    /// accounts
    async fn list_cards(
        &self,
        actor: &Actor,
        filter: CardFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Card>, u64)>;

    /// Update a card; owner or admin
    async fn update_card(&self, actor: &Actor, id: Uuid, changes: CardChanges) -> AppResult<Card>;

    /// Soft delete a card
    async fn delete_card(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CardService using Unit of Work.
pub struct CardManager<U: UnitOfWork> {
    uow: Arc<U>,
    audit: Arc<dyn AuditSink>,
}

impl<U: UnitOfWork> CardManager<U> {
    pub fn new(uow: Arc<U>, audit: Arc<dyn AuditSink>) -> Self {
        Self { uow, audit }
    }
}

#[async_trait]
impl<U: UnitOfWork> CardService for CardManager<U> {
    async fn create_card(
        &self,
        actor: &Actor,
        account_id: Uuid,
        institution_id: Option<Uuid>,
        last_four_digits: String,
        card_type: CardType,
        expires: Option<String>,
    ) -> AppResult<Card> {
        if last_four_digits.len() != CARD_LAST_FOUR_LENGTH
            || !last_four_digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AppError::validation(
                "last_four_digits must be exactly 4 digits",
            ));
        }

        let new_card = Card::new(account_id, institution_id, last_four_digits, card_type, expires);
        let card_id = new_card.id;
        let caller = actor.clone();

        let result = with_transaction!(self.uow, |ctx| {
            // The owning account must exist, belong to the actor and be
            // active, checked against the same transactional view that
            // performs the insert.
            let account = ctx
                .accounts()
                .find_by_id(account_id)
                .await?
                .ok_or(AppError::NotFound)?;
            if !caller.owns_or_admin(account.user_id) {
                return Err(AppError::NotFound);
            }
            if !account.is_active() {
                return Err(AppError::validation("Account is not active"));
            }

            // The optional issuer reference must point at a live, active
            // institution when present.
            if let Some(institution_id) = new_card.institution_id {
                if !ctx
                    .institutions()
                    .exists_and_active(institution_id)
                    .await?
                {
                    return Err(AppError::validation(
                        "Referenced institution does not exist or is not active",
                    ));
                }
            }

            if ctx
                .cards()
                .find_by_account_and_last_four(account_id, &new_card.last_four_digits)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(
                    "A card with these digits already exists on this account",
                ));
            }

            ctx.cards().insert(new_card).await
        });

        let mut event = AuditEvent::new(
            actor.id,
            "card.create",
            AGGREGATE,
            card_id,
            AuditOutcome::from_result(&result),
        );
        if let Ok(ref card) = result {
            event = event.with_after(card);
        }
        audit::emit(self.audit.as_ref(), event).await;

        result
    }

    async fn get_card(&self, actor: &Actor, id: Uuid) -> AppResult<Card> {
        retry::transient(|| async {
            let caller = actor.clone();
            with_transaction!(self.uow, |ctx| {
                let card = ctx
                    .cards()
                    .find_by_id(id)
                    .await?
                    .ok_or(AppError::NotFound)?;
                let account = ctx
                    .accounts()
                    .find_by_id(card.account_id)
                    .await?
                    .ok_or(AppError::NotFound)?;
                if !caller.owns_or_admin(account.user_id) {
                    return Err(AppError::NotFound);
                }
                Ok(card)
            })
        })
        .await
    }

    async fn list_cards(
        &self,
        actor: &Actor,
        filter: CardFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Card>, u64)> {
        retry::transient(|| async {
            let filter = filter.clone();
            let page = page.clone();
            let caller = actor.clone();
            with_transaction!(self.uow, |ctx| {
                // Non-admins list cards per owned account
                if !caller.is_admin() {
                    let account_id = filter.account_id.ok_or_else(|| {
                        AppError::validation("account_id filter is required")
                    })?;
                    let account = ctx
                        .accounts()
                        .find_by_id(account_id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    if !caller.owns_or_admin(account.user_id) {
                        return Err(AppError::NotFound);
                    }
                }
                ctx.cards().list(&filter, &page).await
            })
        })
        .await
    }

    async fn update_card(&self, actor: &Actor, id: Uuid, changes: CardChanges) -> AppResult<Card> {
        let caller = actor.clone();
        let result = with_transaction!(self.uow, |ctx| {
            let before = ctx
                .cards()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            let account = ctx
                .accounts()
                .find_by_id(before.account_id)
                .await?
                .ok_or(AppError::NotFound)?;
            if !caller.owns_or_admin(account.user_id) {
                return Err(AppError::NotFound);
            }

            // Re-pointing the optional issuer reference requires a live,
            // active target; clearing it is always allowed.
            if let Some(Some(institution_id)) = changes.institution_id {
                if !ctx
                    .institutions()
                    .exists_and_active(institution_id)
                    .await?
                {
                    return Err(AppError::validation(
                        "Referenced institution does not exist or is not active",
                    ));
                }
            }

            let after = ctx.cards().update(id, changes).await?;
            Ok((before, after))
        });

        let mut event = AuditEvent::new(
            actor.id,
            "card.update",
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

    async fn delete_card(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let caller = actor.clone();
        let result = with_transaction!(self.uow, |ctx| {
            let card = ctx
                .cards()
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound)?;
            let account = ctx
                .accounts()
                .find_by_id(card.account_id)
                .await?
                .ok_or(AppError::NotFound)?;
            if !caller.owns_or_admin(account.user_id) {
                return Err(AppError::NotFound);
            }

            ctx.cards().soft_delete(id).await
        });

        let event = AuditEvent::new(
            actor.id,
            "card.soft_delete",
            AGGREGATE,
            id,
            AuditOutcome::from_result(&result),
        );
        audit::emit(self.audit.as_ref(), event).await;

        result
    }
}
