//! Identity service: the system of record for user profiles.
//!
//! Layout follows the usual split: `domain` holds the rules, `infra` the
//! sea-orm persistence, `api::grpc` the `UserService` adapter.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use api::grpc::UserServiceImpl;
pub use config::IdentityConfig;
pub use domain::service::IdentityService;
pub use domain::tokens::TokenCodec;
