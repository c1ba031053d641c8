//! SeaORM entity for the `financial_institutions` table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::FinancialInstitution;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_institutions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(unique)]
    pub name: String,
    pub website: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::card::Entity")]
    Cards,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FinancialInstitution {
    fn from(model: Model) -> Self {
        FinancialInstitution {
            id: model.id,
            code: model.code,
            name: model.name,
            website: model.website,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<FinancialInstitution> for ActiveModel {
    fn from(institution: FinancialInstitution) -> Self {
        ActiveModel {
            id: Set(institution.id),
            code: Set(institution.code),
            name: Set(institution.name),
            website: Set(institution.website),
            is_active: Set(institution.is_active),
            created_at: Set(institution.created_at),
            updated_at: Set(institution.updated_at),
            deleted_at: Set(institution.deleted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::TryIntoModel;

    #[test]
    fn mapping_round_trip() {
        let institution =
            FinancialInstitution::new("BOFA".into(), "Bank of America".into(), None);
        let model = ActiveModel::from(institution.clone())
            .try_into_model()
            .unwrap();
        let back = FinancialInstitution::from(model);
        // A null website column maps to None, never to an empty string
        assert!(back.website.is_none());
        assert_eq!(back, institution);
    }
}
