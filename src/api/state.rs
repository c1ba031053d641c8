//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AccountService, AccountTypeService, AuthService, CardService, InstitutionService,
    ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub institution_service: Arc<dyn InstitutionService>,
    pub account_type_service: Arc<dyn AccountTypeService>,
    pub account_service: Arc<dyn AccountService>,
    pub card_service: Arc<dyn CardService>,
    /// Database handle, used by the health endpoint
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            institution_service: container.institutions(),
            account_type_service: container.account_types(),
            account_service: container.accounts(),
            card_service: container.cards(),
            database,
        }
    }

    /// Create application state with manually injected services.
    ///
    /// Primarily useful in tests, where individual services are mocked.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        institution_service: Arc<dyn InstitutionService>,
        account_type_service: Arc<dyn AccountTypeService>,
        account_service: Arc<dyn AccountService>,
        card_service: Arc<dyn CardService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            institution_service,
            account_type_service,
            account_service,
            card_service,
            database,
        }
    }
}
