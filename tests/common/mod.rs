#![allow(dead_code)]

//! Shared test harness: an in-memory SQLite database behind the real
//! migration set, the real Unit of Work, and services wired to a recording
//! audit sink.
//!
//! The pool is capped at one connection so every transaction scope
//! serializes through the same handle, which keeps the in-memory database
//! shared across scopes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use fintrack_api::config::Config;
use fintrack_api::domain::{AccountType, Actor, FinancialInstitution, User, UserRole};
use fintrack_api::errors::AppResult;
use fintrack_api::infra::audit::{AuditEvent, AuditSink};
use fintrack_api::infra::{Database, Persistence};
use fintrack_api::services::{
    AccountManager, AccountTypeManager, AccountTypeService, AuthService, Authenticator,
    CardManager, InstitutionManager, InstitutionService, UserManager,
};

/// Audit sink that stores events for later assertions.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, action: &str) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct TestEnv {
    pub db: Database,
    pub uow: Arc<Persistence>,
    pub audit: Arc<RecordingAuditSink>,
    pub auth: Authenticator<Persistence>,
    pub users: UserManager<Persistence>,
    pub institutions: InstitutionManager<Persistence>,
    pub account_types: AccountTypeManager<Persistence>,
    pub accounts: AccountManager<Persistence>,
    pub cards: CardManager<Persistence>,
}

/// Fresh in-memory database with the full schema applied.
pub async fn setup() -> TestEnv {
    let config = Config::for_database("sqlite::memory:");
    let db = Database::connect(&config).await;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let audit = Arc::new(RecordingAuditSink::default());
    let sink: Arc<dyn AuditSink> = audit.clone();

    TestEnv {
        auth: Authenticator::new(uow.clone(), sink.clone(), config),
        users: UserManager::new(uow.clone(), sink.clone()),
        institutions: InstitutionManager::new(uow.clone(), sink.clone()),
        account_types: AccountTypeManager::new(uow.clone(), sink.clone()),
        accounts: AccountManager::new(uow.clone(), sink.clone()),
        cards: CardManager::new(uow.clone(), sink),
        db,
        uow,
        audit,
    }
}

/// Synthetic admin identity for admin-scoped operations.
pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), UserRole::Admin)
}

/// Register a regular user and return it with its actor identity.
pub async fn register_user(env: &TestEnv, email: &str) -> (User, Actor) {
    let user = env
        .auth
        .register(email.to_string(), "Password123!".to_string(), "Test User".to_string())
        .await
        .expect("register user");
    let actor = Actor::new(user.id, UserRole::User);
    (user, actor)
}

/// Seed an institution and an account type, the references accounts need.
pub async fn seed_references(env: &TestEnv) -> (FinancialInstitution, AccountType) {
    let admin = admin();
    let institution = env
        .institutions
        .create_institution(&admin, "BOFA".into(), "Bank of America".into(), None)
        .await
        .expect("create institution");
    let account_type = env
        .account_types
        .create_account_type(&admin, "CHK".into(), "Checking".into(), None)
        .await
        .expect("create account type");
    (institution, account_type)
}
