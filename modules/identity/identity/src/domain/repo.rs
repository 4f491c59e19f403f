use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::model::UserRecord;

/// Persistence port for user profiles. Soft-deleted rows are invisible.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError>;

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<UserRecord>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, DomainError>;

    /// Overwrite the mutable profile columns and the password hash.
    async fn update(&self, user: &UserRecord) -> Result<(), DomainError>;
}
