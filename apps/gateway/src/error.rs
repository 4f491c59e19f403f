use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_sdk::CatalogError;
use identity_sdk::IdentityError;
use serde::Serialize;
use thiserror::Error;

/// Error rendered to HTTP callers as `{ "code", "error" }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: u16,
    error: &'a str,
}

const UPSTREAM_UNAVAILABLE: &str = "The upstream service is unavailable.";

/// Envelope codes map onto HTTP statuses one to one. Anything that is not
/// a client or server error status is reported as a bad gateway.
#[must_use]
pub fn status_for_code(code: i32) -> StatusCode {
    u16::try_from(code)
        .ok()
        .and_then(|c| StatusCode::from_u16(c).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::Rejected { code, .. })
            | Self::Identity(IdentityError::Rejected { code, .. }) => status_for_code(*code),
            Self::Identity(IdentityError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Catalog(CatalogError::Transport(_))
            | Self::Identity(IdentityError::Transport(_) | IdentityError::Unavailable(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Catalog(CatalogError::Transport(detail)) => {
                tracing::warn!(%detail, "catalog unreachable");
                UPSTREAM_UNAVAILABLE.to_owned()
            }
            Self::Identity(e) if e.code().is_none() => {
                tracing::warn!(error = %e, "identity call failed");
                UPSTREAM_UNAVAILABLE.to_owned()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: status.as_u16(),
            error: &message,
        };
        (status, Json(body)).into_response()
    }
}
