//! Edge gateway: resolves bearer tokens through the identity service and
//! forwards package requests to the catalog over gRPC.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use middleware::identity::{ResolvedIdentity, identity_middleware};
pub use routes::{AppState, build_app, build_router};
