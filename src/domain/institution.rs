//! Financial institution domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Financial institution aggregate (a bank, broker, or card issuer).
///
/// Natural key: `code`. `name` is also unique. Accounts hold a required
/// reference to an institution; cards may hold an optional one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInstitution {
    pub id: Uuid,
    /// Short unique identifier, e.g. "BOFA"
    pub code: String,
    pub name: String,
    pub website: Option<String>,
    /// Inactive institutions cannot gain new references
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FinancialInstitution {
    /// Create a new active institution
    pub fn new(code: String, name: String, website: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            website,
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

/// Institution response (client-facing shape)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstitutionResponse {
    pub id: Uuid,
    /// Short unique identifier
    #[schema(example = "BOFA")]
    pub code: String,
    #[schema(example = "Bank of America")]
    pub name: String,
    #[schema(example = "https://bankofamerica.com")]
    pub website: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FinancialInstitution> for InstitutionResponse {
    fn from(institution: FinancialInstitution) -> Self {
        Self {
            id: institution.id,
            code: institution.code,
            name: institution.name,
            website: institution.website,
            is_active: institution.is_active,
            created_at: institution.created_at,
        }
    }
}
