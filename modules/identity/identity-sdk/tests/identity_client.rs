#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use identity_sdk::proto::{
    EmailLoginRequest, EmailLoginResponse, GetUserByTokenRequest, GetUserByTokenResponse,
    GetUserRequest, GetUserResponse, GetUsersRequest, GetUsersResponse, UpdateUserRequest,
    UpdateUserResponse, User,
};
use identity_sdk::{
    AccountClient, IdentityClient, IdentityClientConfig, IdentityError, IdentityGrpcClient,
    ProfileUpdate, UserService, UserServiceServer, connect_identity, connect_identity_client,
};
use market_transport_grpc::Status;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response};

#[derive(Clone, Default)]
struct FakeUsers {
    users: Arc<HashMap<String, User>>,
    calls: Arc<AtomicUsize>,
}

impl FakeUsers {
    fn with(users: &[(&str, &str)]) -> Self {
        let users = users
            .iter()
            .map(|(id, name)| {
                (
                    (*id).to_owned(),
                    User {
                        id: (*id).to_owned(),
                        name: (*name).to_owned(),
                        avatar: String::new(),
                        summary: String::new(),
                    },
                )
            })
            .collect();
        Self {
            users: Arc::new(users),
            calls: Arc::default(),
        }
    }
}

#[tonic::async_trait]
impl UserService for FakeUsers {
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, tonic::Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = request.into_inner().user_id;
        let response = match self.users.get(&id) {
            Some(user) => GetUserResponse {
                status: Some(Status::ok()),
                user: Some(user.clone()),
            },
            None => GetUserResponse {
                status: Some(Status::new(404, "The user does not exist.")),
                user: None,
            },
        };
        Ok(Response::new(response))
    }

    async fn get_users(
        &self,
        request: Request<GetUsersRequest>,
    ) -> Result<Response<GetUsersResponse>, tonic::Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let users = request
            .into_inner()
            .user_ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect();
        Ok(Response::new(GetUsersResponse {
            status: Some(Status::ok()),
            users,
        }))
    }

    async fn get_user_by_token(
        &self,
        request: Request<GetUserByTokenRequest>,
    ) -> Result<Response<GetUserByTokenResponse>, tonic::Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match request.into_inner().token.as_str() {
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(Response::new(GetUserByTokenResponse::default()))
            }
            "explode" => Err(tonic::Status::unavailable("backend down")),
            "Bearer good" => Ok(Response::new(GetUserByTokenResponse {
                status: Some(Status::ok()),
                user: self.users.get("1").cloned(),
            })),
            _ => Ok(Response::new(GetUserByTokenResponse {
                status: Some(Status::new(401, "The token is invalid.")),
                user: None,
            })),
        }
    }

    async fn email_login(
        &self,
        request: Request<EmailLoginRequest>,
    ) -> Result<Response<EmailLoginResponse>, tonic::Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let req = request.into_inner();
        let response = if req.email == "ada@example.com" && req.password == "hunter22" {
            EmailLoginResponse {
                status: Some(Status::ok()),
                user: self.users.get("1").cloned(),
                token: "Bearer minted".to_owned(),
            }
        } else {
            EmailLoginResponse {
                status: Some(Status::new(400, "The email or password is incorrect.")),
                ..Default::default()
            }
        };
        Ok(Response::new(response))
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, tonic::Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let req = request.into_inner();
        if req.id != req.user_id {
            return Ok(Response::new(UpdateUserResponse {
                status: Some(Status::new(401, "You do not have permission to update this user.")),
                user: None,
            }));
        }
        Ok(Response::new(UpdateUserResponse {
            status: Some(Status::ok()),
            user: Some(User {
                id: req.id,
                name: req.name,
                avatar: req.avatar,
                // Echo whether a password travelled, to check the wire mapping.
                summary: format!("{}|password={}", req.summary, !req.password.is_empty()),
            }),
        }))
    }
}

async fn spawn_server(fake: FakeUsers) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(UserServiceServer::new(fake))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    addr
}

async fn client_for(addr: SocketAddr, call_timeout: Duration) -> IdentityGrpcClient {
    let cfg = IdentityClientConfig::new(format!("http://{addr}")).with_call_timeout(call_timeout);
    IdentityGrpcClient::connect(&cfg).await.unwrap()
}

#[tokio::test]
async fn get_by_id_resolves_and_maps_not_found() {
    let addr = spawn_server(FakeUsers::with(&[("1", "ada")])).await;
    let client = client_for(addr, Duration::from_secs(2)).await;

    let user = client.get_by_id("1").await.unwrap();
    assert_eq!(user.name, "ada");

    let err = client.get_by_id("2").await.unwrap_err();
    assert_eq!(
        err,
        IdentityError::Rejected {
            code: 404,
            message: "The user does not exist.".to_owned()
        }
    );
    assert_eq!(err.code(), Some(404));
}

#[tokio::test]
async fn batch_lookup_skips_unknown_ids_and_empty_batches() {
    let fake = FakeUsers::with(&[("1", "ada"), ("2", "grace")]);
    let calls = fake.calls.clone();
    let addr = spawn_server(fake).await;
    let client = client_for(addr, Duration::from_secs(2)).await;

    let none = client.get_by_ids(&[]).await.unwrap();
    assert!(none.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let ids = vec!["1".to_owned(), "2".to_owned(), "404".to_owned()];
    let mut users = client.get_by_ids(&ids).await.unwrap();
    users.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "grace");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn token_resolution_passes_rejections_through() {
    let addr = spawn_server(FakeUsers::with(&[("1", "ada")])).await;
    let client = client_for(addr, Duration::from_secs(2)).await;

    assert_eq!(client.resolve_token("Bearer good").await.unwrap().id, "1");
    let err = client.resolve_token("forged").await.unwrap_err();
    assert_eq!(err.code(), Some(401));
    assert_eq!(err.to_string(), "The token is invalid.");
}

#[tokio::test]
async fn slow_service_is_cut_off_by_call_timeout() {
    let addr = spawn_server(FakeUsers::default()).await;
    let client = client_for(addr, Duration::from_millis(200)).await;

    let started = Instant::now();
    let err = client.resolve_token("slow").await.unwrap_err();
    assert_eq!(err, IdentityError::Timeout(Duration::from_millis(200)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn transport_status_becomes_transport_error() {
    let addr = spawn_server(FakeUsers::default()).await;
    let client = client_for(addr, Duration::from_secs(2)).await;

    let err = client.resolve_token("explode").await.unwrap_err();
    assert!(matches!(err, IdentityError::Transport(ref m) if m.contains("backend down")));
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn unreachable_service_wires_unavailable_client() {
    let mut cfg = IdentityClientConfig::new("http://127.0.0.1:1");
    cfg.transport = cfg
        .transport
        .with_max_retries(0)
        .with_connect_timeout(Duration::from_millis(200));

    let client = connect_identity_client(&cfg).await;
    let err = client.get_by_id("1").await.unwrap_err();
    assert!(matches!(err, IdentityError::Unavailable(_)));
}

#[tokio::test]
async fn lazy_client_connects_on_first_call() {
    let addr = spawn_server(FakeUsers::with(&[("1", "ada")])).await;
    let mut cfg = IdentityClientConfig::new(format!("http://{addr}"));
    cfg.lazy = true;

    let client = IdentityGrpcClient::connect(&cfg).await.unwrap();
    assert_eq!(client.get_by_id("1").await.unwrap().name, "ada");
}

#[tokio::test]
async fn email_login_returns_user_and_token() {
    let addr = spawn_server(FakeUsers::with(&[("1", "ada")])).await;
    let client = client_for(addr, Duration::from_secs(2)).await;

    let outcome = client.email_login("ada@example.com", "hunter22").await.unwrap();
    assert_eq!(outcome.user.id, "1");
    assert_eq!(outcome.token, "Bearer minted");

    let err = client.email_login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.code(), Some(400));
    assert_eq!(err.to_string(), "The email or password is incorrect.");
}

#[tokio::test]
async fn update_user_maps_fields_and_rejections() {
    let addr = spawn_server(FakeUsers::default()).await;
    let client = client_for(addr, Duration::from_secs(2)).await;

    let update = ProfileUpdate {
        id: "1".to_owned(),
        actor_id: "1".to_owned(),
        name: "Ada L.".to_owned(),
        avatar: "a.png".to_owned(),
        summary: "math".to_owned(),
        password: None,
    };
    let user = client.update_user(update.clone()).await.unwrap();
    assert_eq!(user.name, "Ada L.");
    assert_eq!(user.summary, "math|password=false");

    let with_password = ProfileUpdate {
        password: Some("new-secret".to_owned()),
        ..update.clone()
    };
    assert_eq!(
        client.update_user(with_password).await.unwrap().summary,
        "math|password=true"
    );

    let foreign = ProfileUpdate {
        actor_id: "2".to_owned(),
        ..update
    };
    assert_eq!(client.update_user(foreign).await.unwrap_err().code(), Some(401));
}

#[tokio::test]
async fn shared_handles_fall_back_together() {
    let mut cfg = IdentityClientConfig::new("http://127.0.0.1:1");
    cfg.transport = cfg
        .transport
        .with_max_retries(0)
        .with_connect_timeout(Duration::from_millis(200));

    let handles = connect_identity(&cfg).await;
    assert!(matches!(
        handles.accounts.email_login("a@b.io", "x").await.unwrap_err(),
        IdentityError::Unavailable(_)
    ));
    assert!(matches!(
        handles.resolver.resolve_token("t").await.unwrap_err(),
        IdentityError::Unavailable(_)
    ));
}

#[test]
fn profile_update_debug_hides_password() {
    let update = ProfileUpdate {
        password: Some("hunter22".to_owned()),
        ..ProfileUpdate::default()
    };
    let rendered = format!("{update:?}");
    assert!(!rendered.contains("hunter22"), "{rendered}");
    assert!(rendered.contains("<redacted>"));
}
