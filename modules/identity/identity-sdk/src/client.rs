use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use market_transport_grpc::{GrpcClientConfig, connect_lazy, connect_with_retry, ensure_ok};
use serde::{Deserialize, Serialize};
use tonic::transport::Channel;

use crate::api::{AccountClient, IdentityClient, IdentityError, LoginOutcome, ProfileUpdate, UserIdentity};
use crate::proto::user_service_client::UserServiceClient;
use crate::proto::{
    EmailLoginRequest, GetUserByTokenRequest, GetUserRequest, GetUsersRequest, UpdateUserRequest,
};

/// `identity` section shared by every service that resolves users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityClientConfig {
    #[serde(flatten)]
    pub transport: GrpcClientConfig,

    /// Upper bound for one identity call, independent of the caller.
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,

    /// Defer connecting until the first call instead of at start-up.
    pub lazy: bool,
}

impl Default for IdentityClientConfig {
    fn default() -> Self {
        Self {
            transport: GrpcClientConfig::new("http://127.0.0.1:50051"),
            call_timeout: Duration::from_secs(10),
            lazy: false,
        }
    }
}

impl IdentityClientConfig {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            transport: GrpcClientConfig::new(uri),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// gRPC-backed [`IdentityClient`] over one shared channel.
#[derive(Clone)]
pub struct IdentityGrpcClient {
    inner: UserServiceClient<Channel>,
    call_timeout: Duration,
}

impl IdentityGrpcClient {
    /// Establish the channel per `cfg` (eager with retries, or lazy).
    ///
    /// # Errors
    /// Returns an error if the URI is invalid or, in eager mode, the service
    /// stays unreachable after all retries.
    pub async fn connect(cfg: &IdentityClientConfig) -> anyhow::Result<Self> {
        let channel: Channel = if cfg.lazy {
            connect_lazy("identity", &cfg.transport)?
        } else {
            connect_with_retry("identity", &cfg.transport).await?
        };
        Ok(Self::from_channel(channel, cfg.call_timeout))
    }

    #[must_use]
    pub fn from_channel(channel: Channel, call_timeout: Duration) -> Self {
        Self {
            inner: UserServiceClient::new(channel),
            call_timeout,
        }
    }

    async fn bounded<T, F>(&self, method: &'static str, call: F) -> Result<T, IdentityError>
    where
        F: Future<Output = Result<tonic::Response<T>, tonic::Status>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => {
                tracing::warn!(method, code = ?status.code(), message = status.message(), "identity call failed");
                Err(IdentityError::Transport(format!(
                    "{method}: {:?}: {}",
                    status.code(),
                    status.message()
                )))
            }
            Err(_) => {
                tracing::warn!(method, timeout = ?self.call_timeout, "identity call timed out");
                Err(IdentityError::Timeout(self.call_timeout))
            }
        }
    }
}

fn missing_user(method: &str) -> IdentityError {
    IdentityError::Transport(format!("{method}: success envelope without a user"))
}

#[async_trait]
impl IdentityClient for IdentityGrpcClient {
    async fn get_by_id(&self, id: &str) -> Result<UserIdentity, IdentityError> {
        let mut client = self.inner.clone();
        let request = GetUserRequest {
            user_id: id.to_owned(),
        };
        let response = self.bounded("GetUser", client.get_user(request)).await?;
        ensure_ok(response.status.as_ref())?;
        response
            .user
            .map(UserIdentity::from)
            .ok_or_else(|| missing_user("GetUser"))
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<UserIdentity>, IdentityError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut client = self.inner.clone();
        let request = GetUsersRequest {
            user_ids: ids.to_vec(),
        };
        let response = self.bounded("GetUsers", client.get_users(request)).await?;
        ensure_ok(response.status.as_ref())?;
        Ok(response.users.into_iter().map(UserIdentity::from).collect())
    }

    async fn resolve_token(&self, token: &str) -> Result<UserIdentity, IdentityError> {
        let mut client = self.inner.clone();
        let request = GetUserByTokenRequest {
            token: token.to_owned(),
        };
        let response = self
            .bounded("GetUserByToken", client.get_user_by_token(request))
            .await?;
        ensure_ok(response.status.as_ref())?;
        response
            .user
            .map(UserIdentity::from)
            .ok_or_else(|| missing_user("GetUserByToken"))
    }
}

#[async_trait]
impl AccountClient for IdentityGrpcClient {
    async fn email_login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let mut client = self.inner.clone();
        let request = EmailLoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let response = self.bounded("EmailLogin", client.email_login(request)).await?;
        ensure_ok(response.status.as_ref())?;
        let user = response.user.ok_or_else(|| missing_user("EmailLogin"))?;
        Ok(LoginOutcome {
            user: user.into(),
            token: response.token,
        })
    }

    async fn update_user(&self, update: ProfileUpdate) -> Result<UserIdentity, IdentityError> {
        let mut client = self.inner.clone();
        let request = UpdateUserRequest {
            id: update.id,
            user_id: update.actor_id,
            name: update.name,
            avatar: update.avatar,
            summary: update.summary,
            password: update.password.unwrap_or_default(),
        };
        let response = self.bounded("UpdateUser", client.update_user(request)).await?;
        ensure_ok(response.status.as_ref())?;
        response
            .user
            .map(UserIdentity::from)
            .ok_or_else(|| missing_user("UpdateUser"))
    }
}

/// Stand-in used when the real client could not be constructed. Every call
/// fails with [`IdentityError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableIdentityClient {
    reason: String,
}

impl UnavailableIdentityClient {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, IdentityError> {
        Err(IdentityError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl IdentityClient for UnavailableIdentityClient {
    async fn get_by_id(&self, _id: &str) -> Result<UserIdentity, IdentityError> {
        self.fail()
    }

    async fn get_by_ids(&self, _ids: &[String]) -> Result<Vec<UserIdentity>, IdentityError> {
        self.fail()
    }

    async fn resolve_token(&self, _token: &str) -> Result<UserIdentity, IdentityError> {
        self.fail()
    }
}

#[async_trait]
impl AccountClient for UnavailableIdentityClient {
    async fn email_login(&self, _email: &str, _password: &str) -> Result<LoginOutcome, IdentityError> {
        self.fail()
    }

    async fn update_user(&self, _update: ProfileUpdate) -> Result<UserIdentity, IdentityError> {
        self.fail()
    }
}
