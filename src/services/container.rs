//! Service container - centralized service construction and access.

use std::sync::Arc;

use super::{
    AccountManager, AccountService, AccountTypeManager, AccountTypeService, AuthService,
    Authenticator, CardManager, CardService, InstitutionManager, InstitutionService, UserManager,
    UserService,
};
use crate::config::Config;
use crate::infra::{AuditSink, DbAuditSink, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn institutions(&self) -> Arc<dyn InstitutionService>;
    fn account_types(&self) -> Arc<dyn AccountTypeService>;
    fn accounts(&self) -> Arc<dyn AccountService>;
    fn cards(&self) -> Arc<dyn CardService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    institution_service: Arc<dyn InstitutionService>,
    account_type_service: Arc<dyn AccountTypeService>,
    account_service: Arc<dyn AccountService>,
    card_service: Arc<dyn CardService>,
}

impl Services {
    /// Create service container from database connection and config.
    ///
    /// Wires one shared Unit of Work over the pool and the database audit
    /// sink into every service.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db.clone()));
        let audit: Arc<dyn AuditSink> = Arc::new(DbAuditSink::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), audit.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone(), audit.clone())),
            institution_service: Arc::new(InstitutionManager::new(uow.clone(), audit.clone())),
            account_type_service: Arc::new(AccountTypeManager::new(uow.clone(), audit.clone())),
            account_service: Arc::new(AccountManager::new(uow.clone(), audit.clone())),
            card_service: Arc::new(CardManager::new(uow, audit)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn institutions(&self) -> Arc<dyn InstitutionService> {
        self.institution_service.clone()
    }

    fn account_types(&self) -> Arc<dyn AccountTypeService> {
        self.account_type_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn cards(&self) -> Arc<dyn CardService> {
        self.card_service.clone()
    }
}
