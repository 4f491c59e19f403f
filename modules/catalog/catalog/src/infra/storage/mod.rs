pub mod entity;
mod mapper;
pub mod migrations;
pub mod sea_orm_store;

pub use migrations::Migrator;
pub use sea_orm_store::SeaOrmCatalogStore;
