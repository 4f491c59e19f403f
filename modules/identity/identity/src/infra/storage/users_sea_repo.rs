use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    SqlErr,
};

use super::db_err;
use super::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};
use crate::domain::error::DomainError;
use crate::domain::model::UserRecord;
use crate::domain::repo::UsersRepository;

/// sea-orm implementation of [`UsersRepository`].
#[derive(Clone)]
pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError> {
        let found = UserEntity::find_by_id(id.to_owned())
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<UserRecord>, DomainError> {
        let rows = UserEntity::find()
            .filter(Column::Id.is_in(ids.iter().cloned()))
            .filter(Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, DomainError> {
        let m = UserAM {
            id: Set(user.id.clone()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password: Set(user.password_hash.clone()),
            avatar: Set(user.avatar.clone()),
            summary: Set(user.summary.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            deleted_at: Set(None),
        };

        match m.insert(&self.db).await {
            Ok(_) => Ok(user),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                DomainError::validation("The email has already been taken."),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn update(&self, user: &UserRecord) -> Result<(), DomainError> {
        let m = UserAM {
            id: Set(user.id.clone()),
            name: Set(user.name.clone()),
            email: NotSet,
            password: Set(user.password_hash.clone()),
            avatar: Set(user.avatar.clone()),
            summary: Set(user.summary.clone()),
            created_at: NotSet,
            updated_at: Set(user.updated_at),
            deleted_at: NotSet,
        };
        m.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
