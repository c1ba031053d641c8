//! SeaORM entity for the `account_types` table.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::AccountType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "account_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account::Entity")]
    Accounts,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AccountType {
    fn from(model: Model) -> Self {
        AccountType {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<AccountType> for ActiveModel {
    fn from(account_type: AccountType) -> Self {
        ActiveModel {
            id: Set(account_type.id),
            code: Set(account_type.code),
            name: Set(account_type.name),
            description: Set(account_type.description),
            is_active: Set(account_type.is_active),
            created_at: Set(account_type.created_at),
            updated_at: Set(account_type.updated_at),
            deleted_at: Set(account_type.deleted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::TryIntoModel;

    #[test]
    fn mapping_round_trip() {
        let account_type = AccountType::new(
            "CHK".into(),
            "Checking".into(),
            Some("Everyday checking".into()),
        );
        let model = ActiveModel::from(account_type.clone())
            .try_into_model()
            .unwrap();
        assert_eq!(AccountType::from(model), account_type);
    }
}
