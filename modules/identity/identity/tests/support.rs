#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::sync::Arc;
use std::time::Duration;

use identity::domain::model::UserRecord;
use identity::domain::passwords::hash_password;
use identity::domain::repo::UsersRepository;
use identity::infra::storage::{Migrator, SeaOrmUsersRepository};
use identity::{IdentityService, TokenCodec};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use secrecy::SecretString;

pub async fn inmem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(&SecretString::from("test-secret"), Duration::from_secs(3600))
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub repo: Arc<SeaOrmUsersRepository>,
    pub service: Arc<IdentityService>,
}

pub async fn fixture() -> Fixture {
    let db = inmem_db().await;
    let repo = Arc::new(SeaOrmUsersRepository::new(db.clone()));
    let service = Arc::new(IdentityService::new(repo.clone(), codec()));
    Fixture { db, repo, service }
}

pub async fn seed_user(repo: &SeaOrmUsersRepository, name: &str) -> UserRecord {
    let mut user = UserRecord::new(name, format!("{name}@example.com"));
    user.summary = format!("{name} writes libraries");
    repo.insert(user).await.unwrap()
}

pub async fn soft_delete(db: &DatabaseConnection, id: &str) {
    db.execute_unprepared(&format!(
        "UPDATE users SET deleted_at = '2024-01-01 00:00:00.0 +00:00:00' WHERE id = '{id}'"
    ))
    .await
    .unwrap();
}

pub async fn seed_user_with_password(repo: &SeaOrmUsersRepository, name: &str, password: &str) -> UserRecord {
    let hash = hash_password(password).unwrap();
    let user = UserRecord::new(name, format!("{name}@example.com")).with_password_hash(hash);
    repo.insert(user).await.unwrap()
}
