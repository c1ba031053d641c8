//! Unit of Work pattern implementation.
//!
//! One Unit-of-Work scope is one database transaction. The scope exposes a
//! repository instance per aggregate, all bound to the same transaction, and
//! resolves exactly one way: `Ok` from the closure commits, anything else
//! rolls back. Dropping the transaction mid-flight (a cancelled request, a
//! panic) also rolls back, so commit is strictly opt-in and a bug that bails
//! out partway through an operation can never persist a partial change.
//!
//! Error surface at commit time: a constraint violation is classified into
//! `Conflict` (see `errors`), a lost connection into `Infrastructure`. The
//! transaction is gone in either case.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, IsolationLevel,
    TransactionTrait,
};
use std::time::Duration;

use super::repositories::{
    AccountStore, AccountTypeStore, CardStore, InstitutionStore, UserStore,
};
use crate::config::{TRANSIENT_RETRY_ATTEMPTS, TRANSIENT_RETRY_DELAY_MS};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Note: the generic `transaction` methods make this trait non-object-safe
/// and not directly mockable. For testing, mock at the service level or run
/// integration tests against a real database (see `tests/`).
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed when the closure returns `Ok` and rolled
    /// back on `Err` or drop. Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Execute a closure within a transaction with serializable isolation.
    ///
    /// Use this for operations requiring the strongest consistency guarantees.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repositories returned here borrow the same underlying transaction, so
/// a caller cannot accidentally mix two scopes or hold a repository that
/// outlives its transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> UserStore<'_, DatabaseTransaction> {
        UserStore::new(self.txn)
    }

    pub fn institutions(&self) -> InstitutionStore<'_, DatabaseTransaction> {
        InstitutionStore::new(self.txn)
    }

    pub fn account_types(&self) -> AccountTypeStore<'_, DatabaseTransaction> {
        AccountTypeStore::new(self.txn)
    }

    pub fn accounts(&self) -> AccountStore<'_, DatabaseTransaction> {
        AccountStore::new(self.txn)
    }

    pub fn cards(&self) -> CardStore<'_, DatabaseTransaction> {
        CardStore::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork over a pooled connection.
///
/// The pool bounds the number of concurrently open scopes; acquiring a
/// connection past the pool's `acquire_timeout` fails fast with an
/// `Infrastructure` error instead of queueing indefinitely.
pub struct Persistence {
    db: DatabaseConnection,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Begin a transaction, retrying transient acquisition failures.
    ///
    /// Only the begin step is retried here: once the closure has run, the
    /// scope may hold partial writes and must not be silently re-executed.
    async fn begin(&self, isolation: IsolationLevel) -> AppResult<DatabaseTransaction> {
        let mut attempt = 1;
        loop {
            // SQLite has a single isolation mode; passing a level makes the
            // driver error out rather than ignore it.
            let begin = if self.db.get_database_backend() == DbBackend::Sqlite {
                self.db.begin().await
            } else {
                self.db
                    .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
                    .await
            };

            match begin {
                Ok(txn) => return Ok(txn),
                Err(e) => {
                    let err = AppError::from(e);
                    if !err.is_transient() || attempt >= TRANSIENT_RETRY_ATTEMPTS {
                        return Err(err);
                    }
                    tracing::warn!(attempt, "Transaction begin failed, retrying");
                    tokio::time::sleep(Duration::from_millis(TRANSIENT_RETRY_DELAY_MS)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self.begin(isolation).await?;

        // Create context with borrowed transaction
        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                // Commit is the only path that makes writes durable. A
                // constraint deferred to commit time surfaces here as a
                // classified Conflict and the transaction is already gone.
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                // Rollback on error; the original error wins over any
                // rollback failure.
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // ReadCommitted for balanced consistency/performance
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f)
            .await
    }
}

/// Simpler API for executing transactional operations.
///
/// This helper macro reduces boilerplate when using transactions.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
