//! SeaORM entity for the `accounts` table.
//!
//! The balance column holds integer minor units; the domain type carries an
//! exact `Decimal`. Conversion into an `ActiveModel` is fallible because an
//! amount with sub-cent precision must be rejected, not rounded.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::money;
use crate::domain::{Account, AccountStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub institution_id: Uuid,
    pub account_type_id: Uuid,
    pub name: String,
    pub currency: String,
    pub balance_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::institution::Entity",
        from = "Column::InstitutionId",
        to = "super::institution::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Institution,
    #[sea_orm(
        belongs_to = "super::account_type::Entity",
        from = "Column::AccountTypeId",
        to = "super::account_type::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    AccountType,
    #[sea_orm(has_many = "super::card::Entity")]
    Cards,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::institution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl Related<super::account_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountType.def()
    }
}

impl Related<super::card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Account {
            id: model.id,
            user_id: model.user_id,
            institution_id: model.institution_id,
            account_type_id: model.account_type_id,
            name: model.name,
            currency: model.currency,
            balance: money::from_minor_units(model.balance_minor),
            status: AccountStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl TryFrom<Account> for ActiveModel {
    type Error = AppError;

    fn try_from(account: Account) -> Result<Self, Self::Error> {
        Ok(ActiveModel {
            id: Set(account.id),
            user_id: Set(account.user_id),
            institution_id: Set(account.institution_id),
            account_type_id: Set(account.account_type_id),
            name: Set(account.name),
            currency: Set(account.currency),
            balance_minor: Set(money::to_minor_units(account.balance)?),
            status: Set(account.status.to_string()),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
            deleted_at: Set(account.deleted_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sea_orm::TryIntoModel;
    use std::str::FromStr;

    #[test]
    fn mapping_round_trip() {
        let mut account = Account::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Everyday checking".into(),
            "USD".into(),
        );
        account.balance = Decimal::from_str("-1234.56").unwrap();
        account.status = AccountStatus::Frozen;

        let model = ActiveModel::try_from(account.clone())
            .unwrap()
            .try_into_model()
            .unwrap();
        assert_eq!(model.balance_minor, -123456);
        assert_eq!(Account::from(model), account);
    }

    #[test]
    fn sub_cent_balance_is_rejected() {
        let mut account = Account::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Checking".into(),
            "USD".into(),
        );
        account.balance = Decimal::from_str("0.001").unwrap();
        assert!(ActiveModel::try_from(account).is_err());
    }
}
