use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use catalog_sdk::CatalogClient;
use identity_sdk::{AccountClient, IdentityClient};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::dto::{
    ListPackagesParams, ListTagsParams, LoginInput, LoginView, PackageInput, PackageView, PageView,
    ProfileInput, TagView, UserView,
};
use crate::error::ApiError;
use crate::middleware::identity::{ResolvedIdentity, identity_middleware};

/// Shared handler state. Clients are constructed once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityClient>,
    pub accounts: Arc<dyn AccountClient>,
    pub catalog: Arc<dyn CatalogClient>,
    /// Upper bound for token resolution in the identity middleware.
    pub resolve_timeout: Duration,
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_packages(
    State(state): State<AppState>,
    params: Result<Query<ListPackagesParams>, QueryRejection>,
) -> Result<Json<PageView<PackageView>>, ApiError> {
    let Query(params) = params?;
    let page = state.catalog.list_packages(params.into()).await?;
    Ok(Json(PageView {
        items: page.items.into_iter().map(PackageView::from).collect(),
        total: page.total,
    }))
}

async fn list_tags(
    State(state): State<AppState>,
    params: Result<Query<ListTagsParams>, QueryRejection>,
) -> Result<Json<PageView<TagView>>, ApiError> {
    let Query(params) = params?;
    let page = state.catalog.list_tags(params.into()).await?;
    Ok(Json(PageView {
        items: page.items.into_iter().map(TagView::from).collect(),
        total: page.total,
    }))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackageView>, ApiError> {
    let package = state.catalog.get_package(&id).await?;
    Ok(Json(package.into()))
}

async fn create_package(
    State(state): State<AppState>,
    Extension(ResolvedIdentity(user)): Extension<ResolvedIdentity>,
    input: Result<Json<PackageInput>, JsonRejection>,
) -> Result<Json<PackageView>, ApiError> {
    let Json(input) = input?;
    let package = state.catalog.create_package(input.into_create(user.id)).await?;
    tracing::info!(package_id = %package.id, "package created");
    Ok(Json(package.into()))
}

async fn update_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(ResolvedIdentity(user)): Extension<ResolvedIdentity>,
    input: Result<Json<PackageInput>, JsonRejection>,
) -> Result<Json<PackageView>, ApiError> {
    let Json(input) = input?;
    let package = state
        .catalog
        .update_package(input.into_update(id, user.id))
        .await?;
    Ok(Json(package.into()))
}

async fn current_user(Extension(ResolvedIdentity(user)): Extension<ResolvedIdentity>) -> Json<UserView> {
    Json(user.into())
}

async fn email_login(
    State(state): State<AppState>,
    input: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<LoginView>, ApiError> {
    let Json(input) = input?;
    let outcome = state.accounts.email_login(&input.email, &input.password).await?;
    tracing::info!(user_id = %outcome.user.id, "user signed in");
    Ok(Json(outcome.into()))
}

/// The actor is always the resolved caller; identity decides whether it
/// may edit the target profile.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(ResolvedIdentity(user)): Extension<ResolvedIdentity>,
    input: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let Json(input) = input?;
    let updated = state.accounts.update_user(input.into_update(id, user.id)).await?;
    Ok(Json(updated.into()))
}

/// Routes only; authenticated ones sit behind [`identity_middleware`].
pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/packages", post(create_package))
        .route("/packages/{id}", get(get_package).put(update_package))
        .route("/user/self", get(current_user))
        .route("/users/{id}", put(update_user))
        .route_layer(from_fn_with_state(state.clone(), identity_middleware));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/packages", get(list_packages))
        .route("/packages/tags", get(list_tags))
        .route("/user/email/login", post(email_login))
        .merge(authenticated)
        .with_state(state)
}

/// Routes plus the HTTP stack: request ids, tracing and a request timeout.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    // Registered innermost first; at runtime the request id is set before
    // the trace span opens.
    build_router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
