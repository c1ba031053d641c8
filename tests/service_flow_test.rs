//! Application operation flows: cross-aggregate validation, referential
//! RESTRICT, clear-on-delete, ownership scoping and audit emission.

mod common;

use rust_decimal::Decimal;
use std::str::FromStr;

use fintrack_api::domain::{AccountStatus, CardType};
use fintrack_api::errors::AppError;
use fintrack_api::infra::audit::AuditOutcome;
use fintrack_api::infra::repositories::{
    AccountChanges, AccountFilter, CardFilter, InstitutionChanges,
};
use fintrack_api::services::{AccountService, CardService, InstitutionService, UserService};
use fintrack_api::types::PaginationParams;

use common::{admin, register_user, seed_references, setup};

#[tokio::test]
async fn institution_with_accounts_cannot_be_deleted() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    let account = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Everyday checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    // Scenario: create institution A (active) -> create account X referencing
    // A -> attempt to delete A -> ConflictError, X still references A, A
    // still exists.
    let result = env
        .institutions
        .delete_institution(&admin(), institution.id)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let still_there = env.institutions.get_institution(institution.id).await.unwrap();
    assert!(still_there.deleted_at.is_none());

    let account_after = env.accounts.get_account(&actor, account.id).await.unwrap();
    assert_eq!(account_after.institution_id, institution.id);
}

#[tokio::test]
async fn account_with_cards_cannot_be_deleted() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    let account = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    let card = env
        .cards
        .create_card(&actor, account.id, None, "4242".into(), CardType::Debit, None)
        .await
        .unwrap();

    // Scenario: soft-delete of the account is RESTRICTed while the card
    // lives; the card is untouched.
    let result = env.accounts.delete_account(&actor, account.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let card_after = env.cards.get_card(&actor, card.id).await.unwrap();
    assert_eq!(card_after.last_four_digits, "4242");
    assert_eq!(card_after.account_id, account.id);

    // Removing the card first unblocks the account delete
    env.cards.delete_card(&actor, card.id).await.unwrap();
    env.accounts.delete_account(&actor, account.id).await.unwrap();
}

#[tokio::test]
async fn deleting_institution_clears_optional_card_references() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    // Issuer institution referenced only optionally (no accounts)
    let issuer = env
        .institutions
        .create_institution(&admin(), "AMEX".into(), "American Express".into(), None)
        .await
        .unwrap();

    let account = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    let card = env
        .cards
        .create_card(
            &actor,
            account.id,
            Some(issuer.id),
            "0005".into(),
            CardType::Credit,
            Some("12/27".into()),
        )
        .await
        .unwrap();
    assert_eq!(card.institution_id, Some(issuer.id));

    // No accounts reference the issuer, so the delete goes through and the
    // card survives with its optional reference cleared.
    env.institutions
        .delete_institution(&admin(), issuer.id)
        .await
        .unwrap();

    let card_after = env.cards.get_card(&actor, card.id).await.unwrap();
    assert!(card_after.institution_id.is_none());
    assert!(card_after.deleted_at.is_none());
}

#[tokio::test]
async fn account_creation_revalidates_references_in_scope() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    // Deactivate the institution, then try to reference it
    env.institutions
        .update_institution(
            &admin(),
            institution.id,
            InstitutionChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // A dangling reference is rejected the same way
    let result = env
        .accounts
        .create_account(
            &actor,
            uuid::Uuid::new_v4(),
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn duplicate_account_name_per_user_conflicts() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (_, other_actor) = register_user(&env, "other@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    env.accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    let duplicate = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // The key is per user: another user may reuse the name
    let other = env
        .accounts
        .create_account(
            &other_actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await;
    assert!(other.is_ok());
}

#[tokio::test]
async fn ownership_violations_surface_as_not_found() {
    let env = setup().await;
    let (_, owner) = register_user(&env, "owner@example.com").await;
    let (_, stranger) = register_user(&env, "stranger@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    let account = env
        .accounts
        .create_account(
            &owner,
            institution.id,
            account_type.id,
            "Private".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    // Existence must not leak: not Forbidden, NotFound
    let read = env.accounts.get_account(&stranger, account.id).await;
    assert!(matches!(read, Err(AppError::NotFound)));

    let update = env
        .accounts
        .update_account(
            &stranger,
            account.id,
            AccountChanges {
                name: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update, Err(AppError::NotFound)));

    let delete = env.accounts.delete_account(&stranger, account.id).await;
    assert!(matches!(delete, Err(AppError::NotFound)));

    // Listing is scoped to the caller
    let (accounts, total) = env
        .accounts
        .list_accounts(&stranger, AccountFilter::default(), &PaginationParams::default())
        .await
        .unwrap();
    assert!(accounts.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn partial_update_leaves_unrelated_fields_alone() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    let account = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    let balance = Decimal::from_str("250.75").unwrap();
    env.accounts
        .update_account(
            &actor,
            account.id,
            AccountChanges {
                balance: Some(balance),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Changing only the name must not clobber the balance or status
    let updated = env
        .accounts
        .update_account(
            &actor,
            account.id,
            AccountChanges {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.balance, balance);
    assert_eq!(updated.status, AccountStatus::Active);
    assert_eq!(updated.currency, "USD");
}

#[tokio::test]
async fn user_with_accounts_cannot_be_deleted() {
    let env = setup().await;
    let (user, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    env.accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    let result = env.users.delete_user(&actor, user.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn every_write_operation_audits_exactly_once() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    env.accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    // One event per logical operation, even though account creation touches
    // several repositories
    assert_eq!(env.audit.events_for("user.register").len(), 1);
    assert_eq!(env.audit.events_for("institution.create").len(), 1);
    assert_eq!(env.audit.events_for("account_type.create").len(), 1);

    let creates = env.audit.events_for("account.create");
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].outcome, AuditOutcome::Success);
    assert_eq!(creates[0].actor_id, actor.id);
    assert!(creates[0].after.is_some());

    // Failed operations audit too, with a failure outcome
    let failed = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await;
    assert!(failed.is_err());

    let creates = env.audit.events_for("account.create");
    assert_eq!(creates.len(), 2);
    assert_eq!(creates[1].outcome, AuditOutcome::Failure);
}

#[tokio::test]
async fn card_requires_active_owned_account() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (_, stranger) = register_user(&env, "stranger@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    let account = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    // Someone else's account: NotFound, not Forbidden
    let result = env
        .cards
        .create_card(&stranger, account.id, None, "4242".into(), CardType::Debit, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));

    // Frozen account: validation failure inside the same scope
    env.accounts
        .update_account(
            &actor,
            account.id,
            AccountChanges {
                status: Some(AccountStatus::Frozen),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = env
        .cards
        .create_card(&actor, account.id, None, "4242".into(), CardType::Debit, None)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn duplicate_card_digits_per_account_conflict() {
    let env = setup().await;
    let (_, actor) = register_user(&env, "owner@example.com").await;
    let (institution, account_type) = seed_references(&env).await;

    let account = env
        .accounts
        .create_account(
            &actor,
            institution.id,
            account_type.id,
            "Checking".into(),
            "USD".into(),
        )
        .await
        .unwrap();

    env.cards
        .create_card(&actor, account.id, None, "4242".into(), CardType::Debit, None)
        .await
        .unwrap();

    let duplicate = env
        .cards
        .create_card(&actor, account.id, None, "4242".into(), CardType::Credit, None)
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let (cards, total) = env
        .cards
        .list_cards(
            &actor,
            CardFilter {
                account_id: Some(account.id),
                ..Default::default()
            },
            &PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(cards.len(), 1);
}
