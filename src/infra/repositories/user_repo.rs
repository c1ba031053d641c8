//! User repository backed by SeaORM.
//!
//! Generic over the connection so the same adapter serves both the pooled
//! connection and a transaction scope. Query methods exclude soft-deleted
//! records unless the `_with_deleted` variant is used.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::user::{self, Entity as UserEntity};
use super::ports::{UserChanges, UserRepository};
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

pub struct UserStore<'a, C> {
    conn: &'a C,
}

impl<'a, C> UserStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'a, C: ConnectionTrait> UserRepository for UserStore<'a, C> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn list(&self, page: &PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let query = UserEntity::find().filter(user::Column::DeletedAt.is_null());

        let total = query.clone().count(self.conn).await.map_err(AppError::from)?;
        let models = query
            .order_by_asc(user::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }

    async fn insert(&self, new_user: User) -> AppResult<User> {
        let model = user::ActiveModel::from(new_user)
            .insert(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.to_string());
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let model = UserEntity::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        // Already deleted: idempotent no-op
        if model.deleted_at.is_some() {
            return Ok(());
        }

        let mut active: user::ActiveModel = model.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(self.conn).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_not_null())
            .one(self.conn)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::validation("User is not deleted or does not exist"))?;

        let mut active: user::ActiveModel = model.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn exists_and_active(&self, id: Uuid) -> AppResult<bool> {
        let count = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .count(self.conn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}
