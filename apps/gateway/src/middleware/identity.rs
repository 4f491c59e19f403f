//! Bearer token resolution for authenticated routes.
//!
//! - No `Authorization` header: 401, the identity service is not called
//! - Resolution error or timeout: 401, never retried
//! - Resolved: `user_id` and `user_name` query parameters are replaced with
//!   the resolved values and a [`ResolvedIdentity`] extension is attached

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use identity_sdk::UserIdentity;

use crate::error::ApiError;
use crate::routes::AppState;

pub const USER_ID_PARAM: &str = "user_id";
pub const USER_NAME_PARAM: &str = "user_name";

/// Identity of the caller, as resolved from its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity(pub UserIdentity);

fn token_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rewrite the query string so the resolved identity is the only one.
fn with_identity_params(uri: &Uri, user: &UserIdentity) -> Result<Uri, ApiError> {
    let malformed = |_| ApiError::BadRequest("The query string is malformed.".to_owned());

    let mut pairs: Vec<(String, String)> = match uri.query() {
        Some(q) => serde_urlencoded::from_str(q).map_err(malformed)?,
        None => Vec::new(),
    };
    pairs.retain(|(k, _)| k != USER_ID_PARAM && k != USER_NAME_PARAM);
    pairs.push((USER_ID_PARAM.to_owned(), user.id.clone()));
    pairs.push((USER_NAME_PARAM.to_owned(), user.name.clone()));

    let query = serde_urlencoded::to_string(&pairs)
        .map_err(|e| ApiError::BadRequest(format!("cannot encode identity: {e}")))?;
    let path_and_query = PathAndQuery::try_from(format!("{}?{query}", uri.path()))
        .map_err(|e| ApiError::BadRequest(format!("cannot rebuild request uri: {e}")))?;

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|e| ApiError::BadRequest(format!("cannot rebuild request uri: {e}")))
}

pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = token_from(request.headers()).map(str::to_owned) else {
        tracing::debug!(path = %request.uri().path(), "request without authorization header");
        return ApiError::Unauthorized("The authorization header is required.").into_response();
    };

    let resolved = tokio::time::timeout(state.resolve_timeout, state.identity.resolve_token(&token)).await;
    let user = match resolved {
        Ok(Ok(user)) => user,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "token resolution failed");
            return ApiError::Unauthorized("The token is invalid.").into_response();
        }
        Err(_) => {
            tracing::warn!(timeout = ?state.resolve_timeout, "token resolution timed out");
            return ApiError::Unauthorized("The token is invalid.").into_response();
        }
    };

    match with_identity_params(request.uri(), &user) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => return e.into_response(),
    }
    tracing::debug!(user_id = %user.id, "identity resolved");
    request.extensions_mut().insert(ResolvedIdentity(user));
    next.run(request).await
}
