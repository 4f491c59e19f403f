//! Shared gRPC plumbing for the market services.
//!
//! - [`proto`]: wire types every service embeds (`Status`, `Pagination`)
//! - [`envelope`]: the status envelope contract and the response normalizer
//!   every RPC handler funnels its result through
//! - [`client`]: channel construction with timeouts, keepalive and
//!   connection retry

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod envelope;

/// Generated protobuf types for `market.base.v1`.
pub mod proto {
    tonic::include_proto!("market.base.v1");
}

pub use client::{GrpcClientConfig, connect_lazy, connect_with_retry, connect_with_stack};
pub use envelope::{
    CodedError, EnvelopeError, INTERNAL_ERROR_MESSAGE, StatusEnvelope, ensure_ok, normalize,
    respond,
};
pub use proto::{Pagination, Status};
