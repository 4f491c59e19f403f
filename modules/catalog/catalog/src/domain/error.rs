use identity_sdk::IdentityError;
use market_transport_grpc::CodedError;
use thiserror::Error;

use crate::domain::repo::StoreError;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed or missing caller input.
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// Authenticated actor may not perform the mutation.
    #[error("{message}")]
    Forbidden { message: String },

    /// Identity dependency failed or rejected the lookup.
    #[error(transparent)]
    Upstream(#[from] IdentityError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
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

    pub fn package_not_found() -> Self {
        Self::NotFound {
            message: "The package does not exist.".to_owned(),
        }
    }

    pub fn forbidden_update() -> Self {
        Self::Forbidden {
            message: "You are not allowed to update this package.".to_owned(),
        }
    }
}

impl CodedError for DomainError {
    fn status_code(&self) -> Option<i32> {
        match self {
            Self::Validation { .. } => Some(400),
            // The wire contract reports non-owner mutations as unauthorized.
            Self::Forbidden { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Upstream(e) => e.code(),
            Self::Storage(_) => None,
        }
    }
}
