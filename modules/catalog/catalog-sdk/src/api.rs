use async_trait::async_trait;
use market_transport_grpc::EnvelopeError;

use crate::proto::{
    CreatePackageRequest, GetPackagesRequest, GetTagsRequest, Package, Tag, UpdatePackageRequest,
};

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog transport error: {0}")]
    Transport(String),

    /// Non-success envelope; `message` is caller-facing.
    #[error("{message}")]
    Rejected { code: i32, message: String },
}

impl From<EnvelopeError> for CatalogError {
    fn from(e: EnvelopeError) -> Self {
        Self::Rejected {
            code: e.code,
            message: e.message,
        }
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn create_package(&self, req: CreatePackageRequest) -> Result<Package, CatalogError>;

    async fn get_package(&self, id: &str) -> Result<Package, CatalogError>;

    async fn list_packages(&self, req: GetPackagesRequest) -> Result<Page<Package>, CatalogError>;

    async fn update_package(&self, req: UpdatePackageRequest) -> Result<Package, CatalogError>;

    async fn list_tags(&self, req: GetTagsRequest) -> Result<Page<Tag>, CatalogError>;
}
