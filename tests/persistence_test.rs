//! Unit of Work transaction semantics against a real database.
//!
//! Runs the full stack (migrations, repositories, transactions) on an
//! in-memory SQLite database with a single pooled connection.

mod common;

use std::time::Duration;

use fintrack_api::domain::{AccountType, FinancialInstitution};
use fintrack_api::errors::{AppError, AppResult};
use fintrack_api::infra::repositories::{AccountTypeRepository, InstitutionRepository};
use fintrack_api::infra::UnitOfWork;
use fintrack_api::services::InstitutionService;
use fintrack_api::with_transaction;

use common::{admin, setup};

#[tokio::test]
async fn commit_makes_writes_visible_to_fresh_reads() {
    let env = setup().await;

    let institution = FinancialInstitution::new("BOFA".into(), "Bank of America".into(), None);
    let inserted = with_transaction!(env.uow, |ctx| {
        ctx.institutions().insert(institution).await
    })
    .unwrap();

    let found = with_transaction!(env.uow, |ctx| {
        ctx.institutions().find_by_code("BOFA").await
    })
    .unwrap()
    .expect("committed institution visible");

    assert_eq!(found.id, inserted.id);
    assert_eq!(found.name, "Bank of America");
}

#[tokio::test]
async fn error_in_scope_rolls_back_every_prior_write() {
    let env = setup().await;

    // Two writes across two repositories, then a failure: neither write may
    // survive.
    let result: AppResult<()> = with_transaction!(env.uow, |ctx| {
        ctx.institutions()
            .insert(FinancialInstitution::new(
                "CHASE".into(),
                "Chase".into(),
                None,
            ))
            .await?;
        ctx.account_types()
            .insert(AccountType::new("SAV".into(), "Savings".into(), None))
            .await?;
        Err(AppError::validation("forced failure after two writes"))
    });
    assert!(result.is_err());

    let institution = with_transaction!(env.uow, |ctx| {
        ctx.institutions().find_by_code("CHASE").await
    })
    .unwrap();
    let account_type = with_transaction!(env.uow, |ctx| {
        ctx.account_types().find_by_code("SAV").await
    })
    .unwrap();

    assert!(institution.is_none(), "first write leaked past rollback");
    assert!(account_type.is_none(), "second write leaked past rollback");
}

#[tokio::test]
async fn failing_insert_rolls_back_preceding_insert() {
    let env = setup().await;

    let result = with_transaction!(env.uow, |ctx| {
        ctx.institutions()
            .insert(FinancialInstitution::new("DUP".into(), "First".into(), None))
            .await?;
        // Same code: violates the unique index inside the same scope
        ctx.institutions()
            .insert(FinancialInstitution::new("DUP".into(), "Second".into(), None))
            .await
    });

    assert!(matches!(result, Err(AppError::Conflict(_))));

    let survivor = with_transaction!(env.uow, |ctx| {
        ctx.institutions().find_by_code("DUP").await
    })
    .unwrap();
    assert!(survivor.is_none(), "partial write observable after rollback");
}

#[tokio::test]
async fn soft_delete_is_idempotent() {
    let env = setup().await;

    let institution = with_transaction!(env.uow, |ctx| {
        ctx.institutions()
            .insert(FinancialInstitution::new("WF".into(), "Wells Fargo".into(), None))
            .await
    })
    .unwrap();

    let first = with_transaction!(env.uow, |ctx| {
        ctx.institutions().soft_delete(institution.id).await
    });
    let second = with_transaction!(env.uow, |ctx| {
        ctx.institutions().soft_delete(institution.id).await
    });

    assert!(first.is_ok());
    assert!(second.is_ok(), "second delete must be a no-op, not an error");

    // Excluded from default reads either way
    let visible = with_transaction!(env.uow, |ctx| {
        ctx.institutions().find_by_id(institution.id).await
    })
    .unwrap();
    assert!(visible.is_none());
}

#[tokio::test]
async fn soft_deleting_a_missing_id_is_not_found() {
    let env = setup().await;

    let result = with_transaction!(env.uow, |ctx| {
        ctx.institutions().soft_delete(uuid::Uuid::new_v4()).await
    });
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_unique_inserts_leave_exactly_one_winner() {
    let env = setup().await;
    let admin = admin();

    let (a, b) = tokio::join!(
        env.institutions
            .create_institution(&admin, "RACE".into(), "Racer A".into(), None),
        env.institutions
            .create_institution(&admin, "RACE".into(), "Racer B".into(), None),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one racer must win");

    let loser = if a.is_err() { a.err() } else { b.err() };
    assert!(
        matches!(loser, Some(AppError::Conflict(_))),
        "loser must see a conflict, not an unclassified failure"
    );

    // The surviving record is fully consistent
    let winner = with_transaction!(env.uow, |ctx| {
        ctx.institutions().find_by_code("RACE").await
    })
    .unwrap()
    .expect("winner committed");
    assert!(winner.name == "Racer A" || winner.name == "Racer B");
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_scope_before_commit_leaves_no_trace() {
    let env = setup().await;

    let attempt = env.uow.transaction(|ctx| {
        Box::pin(async move {
            ctx.institutions()
                .insert(FinancialInstitution::new(
                    "GHOST".into(),
                    "Never committed".into(),
                    None,
                ))
                .await?;
            // Simulate a client that disconnects before the commit
            futures::future::pending::<()>().await;
            Ok(())
        })
    });

    let cancelled = tokio::time::timeout(Duration::from_millis(100), attempt).await;
    assert!(cancelled.is_err(), "operation should have been cancelled");

    // Give the dropped transaction a moment to roll back and release the
    // connection.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let found = with_transaction!(env.uow, |ctx| {
        ctx.institutions().find_by_code("GHOST").await
    })
    .unwrap();
    assert!(found.is_none(), "cancelled write must not be observable");
}
