use std::time::Duration;

use async_trait::async_trait;
use market_transport_grpc::EnvelopeError;
use serde::{Deserialize, Serialize};

use crate::proto;

/// Read-only copy of a user profile owned by the identity service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub summary: String,
}

impl From<proto::User> for UserIdentity {
    fn from(u: proto::User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
            summary: u.summary,
        }
    }
}

impl From<UserIdentity> for proto::User {
    fn from(u: UserIdentity) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
            summary: u.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("identity transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success envelope. The message is the
    /// service's own, caller-facing text.
    #[error("{message}")]
    Rejected { code: i32, message: String },

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    /// Envelope code when the identity service itself classified the failure.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::Timeout(_) | Self::Transport(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<EnvelopeError> for IdentityError {
    fn from(e: EnvelopeError) -> Self {
        Self::Rejected {
            code: e.code,
            message: e.message,
        }
    }
}

/// Resolves user ids and bearer tokens into [`UserIdentity`] records.
///
/// Implementations bound every call with their own timeout, regardless of
/// how long the caller is willing to wait.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<UserIdentity, IdentityError>;

    /// Batch lookup. Ids unknown to the service are absent from the result;
    /// order is not guaranteed.
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<UserIdentity>, IdentityError>;

    /// Resolve a bearer token (with or without the `Bearer ` prefix).
    async fn resolve_token(&self, token: &str) -> Result<UserIdentity, IdentityError>;
}

/// Successful email/password sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserIdentity,
    /// Ready to send back as an `Authorization` header value (`Bearer ...`).
    pub token: String,
}

/// Profile overwrite requested by `actor_id` for user `id`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub id: String,
    pub actor_id: String,
    pub name: String,
    pub avatar: String,
    pub summary: String,
    /// New password; `None` keeps the current one.
    pub password: Option<String>,
}

impl std::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("id", &self.id)
            .field("actor_id", &self.actor_id)
            .field("name", &self.name)
            .field("avatar", &self.avatar)
            .field("summary", &self.summary)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Account operations: sign-in and self-service profile edits.
#[async_trait]
pub trait AccountClient: Send + Sync {
    async fn email_login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError>;

    /// Only the profile owner may update it.
    async fn update_user(&self, update: ProfileUpdate) -> Result<UserIdentity, IdentityError>;
}
