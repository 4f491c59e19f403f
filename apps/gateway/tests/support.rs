#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use catalog_sdk::proto::{CreatePackageRequest, GetPackagesRequest, GetTagsRequest, UpdatePackageRequest};
use catalog_sdk::{CatalogClient, CatalogError, Package, Page, Tag};
use gateway::{AppState, build_app};
use http_body_util::BodyExt;
use identity_sdk::{AccountClient, IdentityClient, IdentityError, LoginOutcome, ProfileUpdate, UserIdentity};
use tower::ServiceExt;

pub const GOOD_TOKEN: &str = "Bearer good";
pub const SLOW_TOKEN: &str = "Bearer slow";

#[derive(Default)]
pub struct MockIdentity {
    pub resolve_calls: AtomicUsize,
    pub last_update: Mutex<Option<ProfileUpdate>>,
}

impl MockIdentity {
    pub fn calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

pub fn ada() -> UserIdentity {
    UserIdentity {
        id: "1".to_owned(),
        name: "Ada".to_owned(),
        avatar: "https://avatars.example.com/1.png".to_owned(),
        summary: "first programmer".to_owned(),
    }
}

#[async_trait]
impl IdentityClient for MockIdentity {
    async fn get_by_id(&self, _id: &str) -> Result<UserIdentity, IdentityError> {
        Err(IdentityError::Unavailable("not used by the gateway".to_owned()))
    }

    async fn get_by_ids(&self, _ids: &[String]) -> Result<Vec<UserIdentity>, IdentityError> {
        Err(IdentityError::Unavailable("not used by the gateway".to_owned()))
    }

    async fn resolve_token(&self, token: &str) -> Result<UserIdentity, IdentityError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        match token {
            GOOD_TOKEN => Ok(ada()),
            SLOW_TOKEN => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(ada())
            }
            _ => Err(IdentityError::Rejected {
                code: 401,
                message: "The token is invalid.".to_owned(),
            }),
        }
    }
}

#[async_trait]
impl AccountClient for MockIdentity {
    async fn email_login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        match (email, password) {
            ("ada@example.com", "hunter22") => Ok(LoginOutcome {
                user: ada(),
                token: GOOD_TOKEN.to_owned(),
            }),
            ("down@example.com", _) => Err(IdentityError::Transport("EmailLogin: Unavailable: refused".to_owned())),
            _ => Err(IdentityError::Rejected {
                code: 400,
                message: "The email or password is incorrect.".to_owned(),
            }),
        }
    }

    async fn update_user(&self, update: ProfileUpdate) -> Result<UserIdentity, IdentityError> {
        if update.id != update.actor_id {
            return Err(IdentityError::Rejected {
                code: 401,
                message: "You do not have permission to update this user.".to_owned(),
            });
        }
        let updated = UserIdentity {
            name: update.name.clone(),
            avatar: update.avatar.clone(),
            summary: update.summary.clone(),
            ..ada()
        };
        *self.last_update.lock().unwrap() = Some(update);
        Ok(updated)
    }
}

/// Catalog double that records what the gateway forwarded.
#[derive(Default)]
pub struct MockCatalog {
    pub calls: AtomicUsize,
    pub last_create: Mutex<Option<CreatePackageRequest>>,
    pub last_update: Mutex<Option<UpdatePackageRequest>>,
    pub last_list: Mutex<Option<GetPackagesRequest>>,
}

pub fn package(id: &str, owner: &str) -> Package {
    Package {
        id: id.to_owned(),
        user_id: owner.to_owned(),
        name: "lib".to_owned(),
        link: "https://x".to_owned(),
        last_updated_at: "2024-01-01T00:00:00Z".to_owned(),
        is_public: true,
        tags: vec![Tag {
            id: "t1".to_owned(),
            user_id: owner.to_owned(),
            name: "go".to_owned(),
            ..Tag::default()
        }],
        ..Package::default()
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn create_package(&self, req: CreatePackageRequest) -> Result<Package, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let created = package("new", &req.user_id);
        *self.last_create.lock().unwrap() = Some(req);
        Ok(created)
    }

    async fn get_package(&self, id: &str) -> Result<Package, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match id {
            "missing" => Err(CatalogError::Rejected {
                code: 404,
                message: "The package does not exist.".to_owned(),
            }),
            "odd" => Err(CatalogError::Rejected {
                code: 299,
                message: "odd".to_owned(),
            }),
            "down" => Err(CatalogError::Transport("GetPackage: Unavailable: refused".to_owned())),
            _ => Ok(package(id, "1")),
        }
    }

    async fn list_packages(&self, req: GetPackagesRequest) -> Result<Page<Package>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_list.lock().unwrap() = Some(req);
        Ok(Page {
            items: vec![package("a", "1"), package("b", "2")],
            total: 12,
        })
    }

    async fn update_package(&self, req: UpdatePackageRequest) -> Result<Package, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if req.user_id != "1" {
            return Err(CatalogError::Rejected {
                code: 401,
                message: "You are not allowed to update this package.".to_owned(),
            });
        }
        let updated = package(&req.id, &req.user_id);
        *self.last_update.lock().unwrap() = Some(req);
        Ok(updated)
    }

    async fn list_tags(&self, _req: GetTagsRequest) -> Result<Page<Tag>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Page {
            items: vec![Tag {
                id: "t1".to_owned(),
                user_id: "1".to_owned(),
                name: "go".to_owned(),
                ..Tag::default()
            }],
            total: 1,
        })
    }
}

pub struct Harness {
    pub app: Router,
    pub identity: Arc<MockIdentity>,
    pub catalog: Arc<MockCatalog>,
}

pub fn harness() -> Harness {
    let identity = Arc::new(MockIdentity::default());
    let catalog = Arc::new(MockCatalog::default());
    let state = AppState {
        identity: identity.clone(),
        accounts: identity.clone(),
        catalog: catalog.clone(),
        resolve_timeout: Duration::from_millis(200),
    };
    Harness {
        app: build_app(state, Duration::from_secs(10)),
        identity,
        catalog,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json(method: &str, uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}
