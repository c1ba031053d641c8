//! Card domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Card kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Debit,
    Credit,
}

impl CardType {
    pub const DEBIT: &'static str = "debit";
    pub const CREDIT: &'static str = "credit";
}

impl From<&str> for CardType {
    fn from(s: &str) -> Self {
        match s {
            Self::CREDIT => CardType::Credit,
            _ => CardType::Debit,
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardType::Debit => write!(f, "{}", Self::DEBIT),
            CardType::Credit => write!(f, "{}", Self::CREDIT),
        }
    }
}

/// Card lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Blocked,
    Cancelled,
}

impl CardStatus {
    pub const ACTIVE: &'static str = "active";
    pub const BLOCKED: &'static str = "blocked";
    pub const CANCELLED: &'static str = "cancelled";
}

impl From<&str> for CardStatus {
    fn from(s: &str) -> Self {
        match s {
            Self::BLOCKED => CardStatus::Blocked,
            Self::CANCELLED => CardStatus::Cancelled,
            _ => CardStatus::Active,
        }
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardStatus::Active => write!(f, "{}", Self::ACTIVE),
            CardStatus::Blocked => write!(f, "{}", Self::BLOCKED),
            CardStatus::Cancelled => write!(f, "{}", Self::CANCELLED),
        }
    }
}

/// Card aggregate.
///
/// Required reference: `account_id` (RESTRICT). Optional reference:
/// `institution_id` — cleared, not cascaded, when the institution is
/// removed. Natural key: `(account_id, last_four_digits)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub account_id: Uuid,
    pub institution_id: Option<Uuid>,
    pub last_four_digits: String,
    pub card_type: CardType,
    /// Expiration in `MM/YY` form, if known
    pub expires: Option<String>,
    pub status: CardStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a new active card
    pub fn new(
        account_id: Uuid,
        institution_id: Option<Uuid>,
        last_four_digits: String,
        card_type: CardType,
        expires: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            institution_id,
            last_four_digits,
            card_type,
            expires,
            status: CardStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Card response (client-facing shape)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub institution_id: Option<Uuid>,
    #[schema(example = "4242")]
    pub last_four_digits: String,
    pub card_type: CardType,
    #[schema(example = "12/27")]
    pub expires: Option<String>,
    pub status: CardStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            account_id: card.account_id,
            institution_id: card.institution_id,
            last_four_digits: card.last_four_digits,
            card_type: card.card_type,
            expires: card.expires,
            status: card.status,
            created_at: card.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_status_round_trip() {
        for t in [CardType::Debit, CardType::Credit] {
            assert_eq!(CardType::from(t.to_string().as_str()), t);
        }
        for s in [CardStatus::Active, CardStatus::Blocked, CardStatus::Cancelled] {
            assert_eq!(CardStatus::from(s.to_string().as_str()), s);
        }
    }

    #[test]
    fn card_without_institution_keeps_none() {
        let card = Card::new(Uuid::new_v4(), None, "4242".into(), CardType::Debit, None);
        assert!(card.institution_id.is_none());
        assert_eq!(card.status, CardStatus::Active);
    }
}
