//! Account type domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account type aggregate (checking, savings, credit, ...).
///
/// Natural key: `code`. Accounts hold a required reference to their type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: Uuid,
    /// Short unique identifier, e.g. "CHK"
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Inactive types cannot be assigned to new accounts
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AccountType {
    /// Create a new active account type
    pub fn new(code: String, name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            description,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Account type response (client-facing shape)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountTypeResponse {
    pub id: Uuid,
    #[schema(example = "CHK")]
    pub code: String,
    #[schema(example = "Checking")]
    pub name: String,
    #[schema(example = "Everyday checking account")]
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AccountType> for AccountTypeResponse {
    fn from(account_type: AccountType) -> Self {
        Self {
            id: account_type.id,
            code: account_type.code,
            name: account_type.name,
            description: account_type.description,
            is_active: account_type.is_active,
            created_at: account_type.created_at,
        }
    }
}
