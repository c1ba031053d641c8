//! Repository ports - one contract per aggregate type.
//!
//! Business logic depends on these traits, never on SeaORM types. Every
//! implementation is constructed bound to a single connection or transaction
//! and cannot be re-pointed, so a caller can never mix transaction scopes.
//!
//! Shared contract across all ports:
//! - lookups return `Ok(None)` for missing or soft-deleted records, never an
//!   error; `*_with_deleted` variants exist where a uniqueness policy must
//!   consider soft-deleted rows
//! - `list` takes an explicit filter struct plus pagination and returns the
//!   matching page together with the total count
//! - `update` takes a changes struct of `Option` fields and writes only the
//!   provided fields
//! - `soft_delete` is idempotent: deleting an already-deleted record is a
//!   no-op; deleting a record that never existed is `NotFound`
//! - `exists_and_active` is a cheap existence+status probe for
//!   cross-aggregate validation

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Account, AccountStatus, AccountType, Card, CardStatus, CardType, FinancialInstitution, User,
    UserRole,
};
use crate::errors::AppResult;
use crate::types::PaginationParams;

// =============================================================================
// Field-level change sets
// =============================================================================

/// Partial update for a user; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

/// Partial update for an institution.
///
/// `website` uses a nested `Option`: the outer level means "change this
/// field", the inner level is the new nullable value.
#[derive(Debug, Clone, Default)]
pub struct InstitutionChanges {
    pub name: Option<String>,
    pub website: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Partial update for an account type.
#[derive(Debug, Clone, Default)]
pub struct AccountTypeChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Partial update for an account.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub status: Option<AccountStatus>,
    pub balance: Option<Decimal>,
}

/// Partial update for a card.
#[derive(Debug, Clone, Default)]
pub struct CardChanges {
    /// `Some(None)` clears the optional issuer reference
    pub institution_id: Option<Option<Uuid>>,
    pub expires: Option<Option<String>>,
    pub status: Option<CardStatus>,
}

// =============================================================================
// List filters - explicit named parameters, one struct per aggregate
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct InstitutionFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountTypeFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub user_id: Option<Uuid>,
    pub institution_id: Option<Uuid>,
    pub account_type_id: Option<Uuid>,
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    pub account_id: Option<Uuid>,
    pub institution_id: Option<Uuid>,
    pub card_type: Option<CardType>,
    pub status: Option<CardStatus>,
}

// =============================================================================
// Ports
// =============================================================================

#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>>;
    async fn list(&self, page: &PaginationParams) -> AppResult<(Vec<User>, u64)>;
    async fn insert(&self, user: User) -> AppResult<User>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
    /// Undo a soft delete; fails if the user is not deleted
    async fn restore(&self, id: Uuid) -> AppResult<User>;
    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FinancialInstitution>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<FinancialInstitution>>;
    async fn find_by_code_with_deleted(&self, code: &str)
        -> AppResult<Option<FinancialInstitution>>;
    async fn list(
        &self,
        filter: &InstitutionFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<FinancialInstitution>, u64)>;
    async fn insert(&self, institution: FinancialInstitution) -> AppResult<FinancialInstitution>;
    async fn update(
        &self,
        id: Uuid,
        changes: InstitutionChanges,
    ) -> AppResult<FinancialInstitution>;
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait AccountTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccountType>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<AccountType>>;
    async fn find_by_code_with_deleted(&self, code: &str) -> AppResult<Option<AccountType>>;
    async fn list(
        &self,
        filter: &AccountTypeFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<AccountType>, u64)>;
    async fn insert(&self, account_type: AccountType) -> AppResult<AccountType>;
    async fn update(&self, id: Uuid, changes: AccountTypeChanges) -> AppResult<AccountType>;
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;
    async fn find_by_user_and_name(&self, user_id: Uuid, name: &str)
        -> AppResult<Option<Account>>;
    async fn list(
        &self,
        filter: &AccountFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Account>, u64)>;
    async fn insert(&self, account: Account) -> AppResult<Account>;
    async fn update(&self, id: Uuid, changes: AccountChanges) -> AppResult<Account>;
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool>;
    /// Active accounts holding a required reference to this user
    async fn count_active_by_user(&self, user_id: Uuid) -> AppResult<u64>;
    /// Active accounts holding a required reference to this institution
    async fn count_active_by_institution(&self, institution_id: Uuid) -> AppResult<u64>;
    /// Active accounts holding a required reference to this account type
    async fn count_active_by_account_type(&self, account_type_id: Uuid) -> AppResult<u64>;
}

#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Card>>;
    async fn find_by_account_and_last_four(
        &self,
        account_id: Uuid,
        last_four: &str,
    ) -> AppResult<Option<Card>>;
    async fn list(
        &self,
        filter: &CardFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Card>, u64)>;
    async fn insert(&self, card: Card) -> AppResult<Card>;
    async fn update(&self, id: Uuid, changes: CardChanges) -> AppResult<Card>;
    async fn soft_delete(&self, id: Uuid) -> AppResult<()>;
    /// Active cards holding a required reference to this account
    async fn count_active_by_account(&self, account_id: Uuid) -> AppResult<u64>;
    /// Null the optional issuer reference on every card pointing at this
    /// institution; returns the number of cards touched
    async fn clear_institution(&self, institution_id: Uuid) -> AppResult<u64>;
}
