//! Identity SDK
//!
//! Everything needed to talk to the identity service:
//! - [`IdentityClient`] trait with [`UserIdentity`] / [`IdentityError`]
//! - [`AccountClient`] for email sign-in and profile updates
//! - [`IdentityGrpcClient`], the production implementation
//! - [`connect_identity_client`], which never fails: an unreachable service
//!   yields an [`UnavailableIdentityClient`]
//! - proto stubs for the server side

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod api;
pub use api::{
    AccountClient, IdentityClient, IdentityError, LoginOutcome, ProfileUpdate, UserIdentity,
};

mod client;
mod wiring;
pub use client::{IdentityClientConfig, IdentityGrpcClient, UnavailableIdentityClient};
pub use wiring::{IdentityHandles, connect_identity, connect_identity_client};

/// Generated protobuf types for `market.identity.v1`.
pub mod proto {
    tonic::include_proto!("market.identity.v1");
}

pub use proto::user_service_server::{UserService, UserServiceServer};
pub use proto::{
    EmailLoginRequest, EmailLoginResponse, GetUserByTokenRequest, GetUserByTokenResponse,
    GetUserRequest, GetUserResponse, GetUsersRequest, GetUsersResponse, UpdateUserRequest,
    UpdateUserResponse, User,
};

market_transport_grpc::impl_status_envelope!(
    GetUserResponse,
    GetUsersResponse,
    GetUserByTokenResponse,
    EmailLoginResponse,
    UpdateUserResponse,
);

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "market.identity.v1.UserService";
