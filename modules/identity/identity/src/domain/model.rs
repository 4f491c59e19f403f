use std::fmt;

use identity_sdk::UserIdentity;
use time::OffsetDateTime;

/// Stored user profile. `email` and `password_hash` never leave the service.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string; empty when the account cannot sign in.
    pub password_hash: String,
    pub avatar: String,
    pub summary: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("avatar", &self.avatar)
            .field("summary", &self.summary)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl UserRecord {
    /// New profile with a fresh v7 id and both audit stamps set to now.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: String::new(),
            avatar: String::new(),
            summary: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }
}

impl From<UserRecord> for UserIdentity {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
            summary: u.summary,
        }
    }
}
