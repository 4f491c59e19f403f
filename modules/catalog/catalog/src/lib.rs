//! Catalog service: packages, their tags and owner enrichment.
//!
//! `domain` holds the tag reconciler and the package aggregator, `infra`
//! the sea-orm store, `api::grpc` the `PackageService` adapter.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use api::grpc::PackageServiceImpl;
pub use config::CatalogConfig;
pub use domain::packages::PackageAggregator;
pub use domain::tag_catalog::TagCatalog;
pub use domain::tags::TagReconciler;
