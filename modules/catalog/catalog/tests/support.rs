#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catalog::domain::model::{Package, PackageDraft};
use catalog::domain::repo::CatalogStore;
use catalog::infra::storage::{Migrator, SeaOrmCatalogStore};
use catalog::{PackageAggregator, PackageServiceImpl, TagCatalog};
use identity_sdk::{IdentityClient, IdentityError, UserIdentity};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;

pub async fn inmem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Identity double with call counters and a switchable failure mode.
#[derive(Default)]
pub struct MockIdentityClient {
    users: Mutex<HashMap<String, UserIdentity>>,
    pub single_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl MockIdentityClient {
    pub fn with_users(names: &[(&str, &str)]) -> Arc<Self> {
        let mock = Self::default();
        {
            let mut users = mock.users.lock().unwrap();
            for (id, name) in names {
                users.insert(
                    (*id).to_owned(),
                    UserIdentity {
                        id: (*id).to_owned(),
                        name: (*name).to_owned(),
                        avatar: format!("https://avatars.example.com/{id}.png"),
                        summary: String::new(),
                    },
                );
            }
        }
        Arc::new(mock)
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), IdentityError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IdentityError::Timeout(Duration::from_secs(10)));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityClient for MockIdentityClient {
    async fn get_by_id(&self, id: &str) -> Result<UserIdentity, IdentityError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.users
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                code: 404,
                message: "The user does not exist.".to_owned(),
            })
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<UserIdentity>, IdentityError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn resolve_token(&self, _token: &str) -> Result<UserIdentity, IdentityError> {
        Err(IdentityError::Rejected {
            code: 401,
            message: "The token is invalid.".to_owned(),
        })
    }
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub store: Arc<SeaOrmCatalogStore>,
    pub identity: Arc<MockIdentityClient>,
    pub packages: Arc<PackageAggregator>,
    pub tags: Arc<TagCatalog>,
    pub service: PackageServiceImpl,
}

pub async fn fixture() -> Fixture {
    let db = inmem_db().await;
    let store = Arc::new(SeaOrmCatalogStore::new(db.clone(), Duration::from_secs(5)));
    let identity = MockIdentityClient::with_users(&[("1", "Ada"), ("2", "Grace"), ("3", "Linus")]);
    let packages = Arc::new(PackageAggregator::new(store.clone(), identity.clone()));
    let tags = Arc::new(TagCatalog::new(store.clone()));
    let service = PackageServiceImpl::new(packages.clone(), tags.clone());
    Fixture {
        db,
        store,
        identity,
        packages,
        tags,
        service,
    }
}

pub fn draft(name: &str, tags: &[&str]) -> PackageDraft {
    PackageDraft {
        name: name.to_owned(),
        link: format!("https://example.com/{name}"),
        summary: format!("{name} in one line"),
        description: String::new(),
        cover: String::new(),
        version: "1.0.0".to_owned(),
        last_updated_at: "2024-01-01T00:00:00Z".to_owned(),
        tag_names: tags.iter().map(|t| (*t).to_owned()).collect(),
        is_public: None,
    }
}

/// Write a package row directly, with explicit ordering inputs.
pub async fn seed_package(
    store: &SeaOrmCatalogStore,
    id: &str,
    owner: &str,
    name: &str,
    view_count: u32,
    created_at: OffsetDateTime,
) -> Package {
    let package = Package {
        id: id.to_owned(),
        user_id: owner.to_owned(),
        name: name.to_owned(),
        summary: String::new(),
        description: String::new(),
        link: format!("https://example.com/{name}"),
        cover: String::new(),
        version: "0.1.0".to_owned(),
        last_updated_at: created_at,
        view_count,
        is_public: true,
        created_at,
        updated_at: created_at,
        tags: Vec::new(),
        owner: None,
    };
    store.insert_package(&package).await.unwrap();
    package
}

pub async fn count_rows(db: &DatabaseConnection, sql: &str) -> i64 {
    let row = db
        .query_one(sea_orm::Statement::from_string(
            db.get_database_backend(),
            sql.to_owned(),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}

pub async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute_unprepared(sql).await.unwrap();
}
