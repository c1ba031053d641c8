//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Unit of Work for transaction management
//! - Audit sink adapters
//! - Bounded retry of transient failures

pub mod audit;
pub mod db;
pub mod repositories;
pub mod retry;
pub mod unit_of_work;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, DbAuditSink, TracingAuditSink};
pub use db::{Database, Migrator};
pub use repositories::{
    AccountRepository, AccountTypeRepository, CardRepository, InstitutionRepository,
    UserRepository,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use audit::MockAuditSink;
