use std::collections::HashSet;
use std::sync::Arc;

use identity_sdk::{LoginOutcome, ProfileUpdate, UserIdentity};
use time::OffsetDateTime;
use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::passwords::{hash_password, verify_password};
use crate::domain::repo::UsersRepository;
use crate::domain::tokens::{TokenCodec, strip_bearer};
use crate::domain::validation::{validate_login, validate_update};

/// Largest batch accepted by [`IdentityService::get_users`].
pub const MAX_BATCH: usize = 100;

pub struct IdentityService {
    repo: Arc<dyn UsersRepository>,
    tokens: TokenCodec,
}

impl IdentityService {
    pub fn new(repo: Arc<dyn UsersRepository>, tokens: TokenCodec) -> Self {
        Self { repo, tokens }
    }

    #[instrument(skip_all, fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<UserIdentity, DomainError> {
        if id.is_empty() {
            return Err(DomainError::required("user_id"));
        }
        self.repo
            .find_by_id(id)
            .await?
            .map(UserIdentity::from)
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// Unknown ids are skipped; duplicates and blanks are collapsed.
    #[instrument(skip_all, fields(requested = ids.len()))]
    pub async fn get_users(&self, ids: &[String]) -> Result<Vec<UserIdentity>, DomainError> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = ids
            .iter()
            .filter(|id| !id.is_empty() && seen.insert(id.as_str()))
            .cloned()
            .collect();

        if unique.len() > MAX_BATCH {
            return Err(DomainError::validation(format!(
                "At most {MAX_BATCH} user ids can be requested at once."
            )));
        }
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.repo.find_by_ids(&unique).await?;
        tracing::debug!(found = found.len(), "batch user lookup");
        Ok(found.into_iter().map(UserIdentity::from).collect())
    }

    #[instrument(skip_all)]
    pub async fn get_user_by_token(&self, raw: &str) -> Result<UserIdentity, DomainError> {
        let token = strip_bearer(raw);
        if token.is_empty() {
            return Err(DomainError::required("token"));
        }

        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "token verification failed");
            DomainError::invalid_token(e.to_string())
        })?;

        self.get_user(&claims.sub).await
    }

    /// Check the password and mint a `Bearer` token for the account.
    #[instrument(skip_all)]
    pub async fn email_login(&self, email: &str, password: &str) -> Result<LoginOutcome, DomainError> {
        validate_login(email, password)?;

        let Some(user) = self.repo.find_by_email(email).await? else {
            tracing::debug!("login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let stored = user.password_hash.clone();
        let attempt = password.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&attempt, &stored))
            .await
            .map_err(|e| DomainError::internal(format!("password check aborted: {e}")))?;
        if !matches {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|e| DomainError::internal(e.to_string()))?;
        tracing::info!(user_id = %user.id, "user signed in");
        Ok(LoginOutcome {
            user: user.into(),
            token: format!("Bearer {token}"),
        })
    }

    /// Owner-only overwrite of name, avatar and summary; the password is
    /// replaced only when a new one is given.
    #[instrument(skip_all, fields(user_id = %update.id, actor_id = %update.actor_id))]
    pub async fn update_user(&self, update: ProfileUpdate) -> Result<UserIdentity, DomainError> {
        validate_update(&update)?;

        let mut user = self
            .repo
            .find_by_id(&update.id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(&update.id))?;

        if user.id != update.actor_id {
            tracing::warn!("profile update rejected: actor is not the owner");
            return Err(DomainError::forbidden(update.actor_id));
        }

        if let Some(password) = update.password {
            user.password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
                .await
                .map_err(|e| DomainError::internal(format!("password hashing aborted: {e}")))??;
        }
        user.name = update.name;
        user.avatar = update.avatar;
        user.summary = update.summary;
        user.updated_at = OffsetDateTime::now_utc();

        self.repo.update(&user).await?;
        tracing::info!("profile updated");
        Ok(user.into())
    }
}
