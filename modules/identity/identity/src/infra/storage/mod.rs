pub mod entity;
pub mod migrations;
pub mod users_sea_repo;

pub use migrations::Migrator;
pub use users_sea_repo::SeaOrmUsersRepository;

use crate::domain::error::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::database(e.to_string())
}
