//! Card repository backed by SeaORM.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::card::{self, Entity as CardEntity};
use super::ports::{CardChanges, CardFilter, CardRepository};
use crate::domain::Card;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

pub struct CardStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> CardStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

fn apply_filter(query: Select<CardEntity>, filter: &CardFilter) -> Select<CardEntity> {
    let mut query = query;
    if let Some(account_id) = filter.account_id {
        query = query.filter(card::Column::AccountId.eq(account_id));
    }
    if let Some(institution_id) = filter.institution_id {
        query = query.filter(card::Column::InstitutionId.eq(institution_id));
    }
    if let Some(card_type) = filter.card_type {
        query = query.filter(card::Column::CardType.eq(card_type.to_string()));
    }
    if let Some(status) = filter.status {
        query = query.filter(card::Column::Status.eq(status.to_string()));
    }
    query
}

#[async_trait]
impl<'a, C: ConnectionTrait> CardRepository for CardStore<'a, C> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Card>> {
        let result = CardEntity::find_by_id(id)
            .filter(card::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Card::from))
    }

    async fn find_by_account_and_last_four(
        &self,
        account_id: Uuid,
        last_four: &str,
    ) -> AppResult<Option<Card>> {
        let result = CardEntity::find()
            .filter(card::Column::AccountId.eq(account_id))
            .filter(card::Column::LastFourDigits.eq(last_four))
            .filter(card::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Card::from))
    }

    async fn list(
        &self,
        filter: &CardFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Card>, u64)> {
        let query = apply_filter(
            CardEntity::find().filter(card::Column::DeletedAt.is_null()),
            filter,
        );

        let total = query.clone().count(self.conn).await.map_err(AppError::from)?;
        let models = query
            .order_by_asc(card::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok((models.into_iter().map(Card::from).collect(), total))
    }

    async fn insert(&self, new_card: Card) -> AppResult<Card> {
        let model = card::ActiveModel::from(new_card)
            .insert(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(Card::from(model))
    }

    async fn update(&self, id: Uuid, changes: CardChanges) -> AppResult<Card> {
        let model = CardEntity::find_by_id(id)
            .filter(card::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        let mut active: card::ActiveModel = model.into();
        if let Some(institution_id) = changes.institution_id {
            active.institution_id = Set(institution_id);
        }
        if let Some(expires) = changes.expires {
            active.expires = Set(expires);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(AppError::from)?;
        Ok(Card::from(model))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let model = CardEntity::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        if model.deleted_at.is_some() {
            return Ok(());
        }

        let mut active: card::ActiveModel = model.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(self.conn).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn count_active_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        CardEntity::find()
            .filter(card::Column::AccountId.eq(account_id))
            .filter(card::Column::DeletedAt.is_null())
            .count(self.conn)
            .await
            .map_err(AppError::from)
    }

    async fn clear_institution(&self, institution_id: Uuid) -> AppResult<u64> {
        // Soft-deleted cards keep the historical reference; only live cards
        // have their optional issuer link cleared.
        let result = CardEntity::update_many()
            .col_expr(card::Column::InstitutionId, Expr::value(None::<Uuid>))
            .col_expr(card::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(card::Column::InstitutionId.eq(institution_id))
            .filter(card::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
