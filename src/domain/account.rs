//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub const ACTIVE: &'static str = "active";
    pub const FROZEN: &'static str = "frozen";
    pub const CLOSED: &'static str = "closed";
}

impl From<&str> for AccountStatus {
    fn from(s: &str) -> Self {
        match s {
            Self::FROZEN => AccountStatus::Frozen,
            Self::CLOSED => AccountStatus::Closed,
            _ => AccountStatus::Active,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "{}", Self::ACTIVE),
            AccountStatus::Frozen => write!(f, "{}", Self::FROZEN),
            AccountStatus::Closed => write!(f, "{}", Self::CLOSED),
        }
    }
}

/// Account aggregate.
///
/// Required references: owner (`user_id`), institution (`institution_id`),
/// and type (`account_type_id`) — all RESTRICT. Natural key:
/// `(user_id, name)`. The balance is an exact decimal amount; storage keeps
/// it as integer minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub institution_id: Uuid,
    pub account_type_id: Uuid,
    pub name: String,
    /// ISO-4217 currency code
    pub currency: String,
    pub balance: Decimal,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new active account with a zero balance
    pub fn new(
        user_id: Uuid,
        institution_id: Uuid,
        account_type_id: Uuid,
        name: String,
        currency: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            institution_id,
            account_type_id,
            name,
            currency,
            balance: Decimal::ZERO,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the account can be referenced by new cards
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none() && self.status == AccountStatus::Active
    }
}

/// Account response (client-facing shape)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub institution_id: Uuid,
    pub account_type_id: Uuid,
    #[schema(example = "Everyday checking")]
    pub name: String,
    #[schema(example = "USD")]
    pub currency: String,
    /// Exact decimal amount, serialized as a string
    #[schema(value_type = String, example = "1234.56")]
    pub balance: Decimal,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            institution_id: account.institution_id,
            account_type_id: account.account_type_id,
            name: account.name,
            currency: account.currency,
            balance: account.balance,
            status: account.status,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_round_trip() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Frozen,
            AccountStatus::Closed,
        ] {
            assert_eq!(AccountStatus::from(status.to_string().as_str()), status);
        }
    }

    #[test]
    fn new_account_is_active_with_zero_balance() {
        let account = Account::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Checking".into(),
            "USD".into(),
        );
        assert!(account.is_active());
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn frozen_account_is_not_active() {
        let mut account = Account::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Checking".into(),
            "USD".into(),
        );
        account.status = AccountStatus::Frozen;
        assert!(!account.is_active());
    }
}
