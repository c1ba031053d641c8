//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence. The port
//! traits in `ports` are the contracts business logic sees; the `*Store`
//! adapters implement them against SeaORM, generic over the connection so
//! the same code serves the pool and a transaction scope.

mod account_repo;
mod account_type_repo;
mod card_repo;
pub(crate) mod entities;
mod institution_repo;
mod ports;
mod user_repo;

pub use ports::{
    AccountChanges, AccountFilter, AccountRepository, AccountTypeChanges, AccountTypeFilter,
    AccountTypeRepository, CardChanges, CardFilter, CardRepository, InstitutionChanges,
    InstitutionFilter, InstitutionRepository, UserChanges, UserRepository,
};

pub use account_repo::AccountStore;
pub use account_type_repo::AccountTypeStore;
pub use card_repo::CardStore;
pub use institution_repo::InstitutionStore;
pub use user_repo::UserStore;

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use ports::{
    MockAccountRepository, MockAccountTypeRepository, MockCardRepository,
    MockInstitutionRepository, MockUserRepository,
};
