//! Financial institution repository backed by SeaORM.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::institution::{self, Entity as InstitutionEntity};
use super::ports::{InstitutionChanges, InstitutionFilter, InstitutionRepository};
use crate::domain::FinancialInstitution;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

pub struct InstitutionStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> InstitutionStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

fn apply_filter(
    query: Select<InstitutionEntity>,
    filter: &InstitutionFilter,
) -> Select<InstitutionEntity> {
    match filter.is_active {
        Some(flag) => query.filter(institution::Column::IsActive.eq(flag)),
        None => query,
    }
}

#[async_trait]
impl<'a, C: ConnectionTrait> InstitutionRepository for InstitutionStore<'a, C> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FinancialInstitution>> {
        let result = InstitutionEntity::find_by_id(id)
            .filter(institution::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(FinancialInstitution::from))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<FinancialInstitution>> {
        let result = InstitutionEntity::find()
            .filter(institution::Column::Code.eq(code))
            .filter(institution::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(FinancialInstitution::from))
    }

    async fn find_by_code_with_deleted(
        &self,
        code: &str,
    ) -> AppResult<Option<FinancialInstitution>> {
        let result = InstitutionEntity::find()
            .filter(institution::Column::Code.eq(code))
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(FinancialInstitution::from))
    }

    async fn list(
        &self,
        filter: &InstitutionFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<FinancialInstitution>, u64)> {
        let query = apply_filter(
            InstitutionEntity::find().filter(institution::Column::DeletedAt.is_null()),
            filter,
        );

        let total = query.clone().count(self.conn).await.map_err(AppError::from)?;
        let models = query
            .order_by_asc(institution::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok((
            models.into_iter().map(FinancialInstitution::from).collect(),
            total,
        ))
    }

    async fn insert(
        &self,
        new_institution: FinancialInstitution,
    ) -> AppResult<FinancialInstitution> {
        let model = institution::ActiveModel::from(new_institution)
            .insert(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(FinancialInstitution::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: InstitutionChanges,
    ) -> AppResult<FinancialInstitution> {
        let model = InstitutionEntity::find_by_id(id)
            .filter(institution::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        let mut active: institution::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(website) = changes.website {
            active.website = Set(website);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(AppError::from)?;
        Ok(FinancialInstitution::from(model))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let model = InstitutionEntity::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        if model.deleted_at.is_some() {
            return Ok(());
        }

        let mut active: institution::ActiveModel = model.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(self.conn).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool> {
        let count = InstitutionEntity::find_by_id(id)
            .filter(institution::Column::DeletedAt.is_null())
            .filter(institution::Column::IsActive.eq(true))
            .count(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}
