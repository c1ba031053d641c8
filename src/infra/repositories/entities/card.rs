//! SeaORM entity for the `cards` table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Card, CardStatus, CardType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    /// Optional issuer reference; nulled when the institution is removed
    pub institution_id: Option<Uuid>,
    pub last_four_digits: String,
    pub card_type: String,
    pub expires: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::institution::Entity",
        from = "Column::InstitutionId",
        to = "super::institution::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Institution,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::institution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Card {
    fn from(model: Model) -> Self {
        Card {
            id: model.id,
            account_id: model.account_id,
            institution_id: model.institution_id,
            last_four_digits: model.last_four_digits,
            card_type: CardType::from(model.card_type.as_str()),
            expires: model.expires,
            status: CardStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<Card> for ActiveModel {
    fn from(card: Card) -> Self {
        ActiveModel {
            id: Set(card.id),
            account_id: Set(card.account_id),
            institution_id: Set(card.institution_id),
            last_four_digits: Set(card.last_four_digits),
            card_type: Set(card.card_type.to_string()),
            expires: Set(card.expires),
            status: Set(card.status.to_string()),
            created_at: Set(card.created_at),
            updated_at: Set(card.updated_at),
            deleted_at: Set(card.deleted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::TryIntoModel;

    #[test]
    fn mapping_round_trip() {
        let card = Card::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            "4242".into(),
            CardType::Credit,
            Some("12/27".into()),
        );
        let model = ActiveModel::from(card.clone()).try_into_model().unwrap();
        assert_eq!(Card::from(model), card);
    }

    #[test]
    fn null_institution_maps_to_none() {
        let card = Card::new(Uuid::new_v4(), None, "0001".into(), CardType::Debit, None);
        let model = ActiveModel::from(card).try_into_model().unwrap();
        assert!(model.institution_id.is_none());
        assert!(Card::from(model).institution_id.is_none());
    }
}
