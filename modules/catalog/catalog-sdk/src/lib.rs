//! Catalog SDK
//!
//! - [`CatalogClient`] trait and [`CatalogError`]
//! - [`CatalogGrpcClient`], the gRPC implementation used by the gateway
//! - proto stubs for the catalog server

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod api;
mod client;

pub use api::{CatalogClient, CatalogError, Page};
pub use client::CatalogGrpcClient;

/// Generated protobuf types for `market.catalog.v1`.
pub mod proto {
    tonic::include_proto!("market.catalog.v1");
}

pub use proto::package_service_server::{PackageService, PackageServiceServer};
pub use proto::{
    CreatePackageRequest, CreatePackageResponse, GetPackageRequest, GetPackageResponse,
    GetPackagesRequest, GetPackagesResponse, GetTagsRequest, GetTagsResponse, Package,
    PackagesQuery, Tag, TagsQuery, UpdatePackageRequest, UpdatePackageResponse,
};

market_transport_grpc::impl_status_envelope!(
    CreatePackageResponse,
    GetPackageResponse,
    GetPackagesResponse,
    UpdatePackageResponse,
    GetTagsResponse,
);

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "market.catalog.v1.PackageService";
