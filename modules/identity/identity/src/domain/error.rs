use market_transport_grpc::CodedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },

    #[error("The user does not exist.")]
    UserNotFound { id: String },

    #[error("The token is invalid.")]
    InvalidToken { reason: String },

    /// Unknown email and wrong password look the same to the caller.
    #[error("The email or password is incorrect.")]
    InvalidCredentials,

    #[error("You do not have permission to update this user.")]
    Forbidden { actor_id: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::validation(format!("The {field} field is required."))
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn forbidden(actor_id: impl Into<String>) -> Self {
        Self::Forbidden {
            actor_id: actor_id.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl CodedError for DomainError {
    fn status_code(&self) -> Option<i32> {
        match self {
            Self::Validation { .. } | Self::InvalidCredentials => Some(400),
            Self::InvalidToken { .. } | Self::Forbidden { .. } => Some(401),
            Self::UserNotFound { .. } => Some(404),
            Self::Database { .. } | Self::Internal { .. } => None,
        }
    }
}
