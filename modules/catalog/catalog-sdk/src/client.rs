use async_trait::async_trait;
use market_transport_grpc::{GrpcClientConfig, connect_lazy, ensure_ok};
use tonic::transport::Channel;

use crate::api::{CatalogClient, CatalogError, Page};
use crate::proto::package_service_client::PackageServiceClient;
use crate::proto::{
    CreatePackageRequest, GetPackageRequest, GetPackagesRequest, GetTagsRequest, Package, Tag,
    UpdatePackageRequest,
};

/// gRPC-backed [`CatalogClient`]. The channel connects on first use.
#[derive(Clone)]
pub struct CatalogGrpcClient {
    inner: PackageServiceClient<Channel>,
}

impl CatalogGrpcClient {
    /// # Errors
    /// Returns an error if `cfg.uri` is not a valid URI.
    pub fn connect(cfg: &GrpcClientConfig) -> anyhow::Result<Self> {
        let channel: Channel = connect_lazy("catalog", cfg)?;
        Ok(Self::from_channel(channel))
    }

    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: PackageServiceClient::new(channel),
        }
    }
}

fn transport(method: &'static str) -> impl FnOnce(tonic::Status) -> CatalogError {
    move |status| {
        tracing::warn!(method, code = ?status.code(), message = status.message(), "catalog call failed");
        CatalogError::Transport(format!("{method}: {:?}: {}", status.code(), status.message()))
    }
}

fn missing_package(method: &str) -> CatalogError {
    CatalogError::Transport(format!("{method}: success envelope without a package"))
}

#[async_trait]
impl CatalogClient for CatalogGrpcClient {
    async fn create_package(&self, req: CreatePackageRequest) -> Result<Package, CatalogError> {
        let mut client = self.inner.clone();
        let resp = client
            .create_package(req)
            .await
            .map_err(transport("CreatePackage"))?
            .into_inner();
        ensure_ok(resp.status.as_ref())?;
        resp.package.ok_or_else(|| missing_package("CreatePackage"))
    }

    async fn get_package(&self, id: &str) -> Result<Package, CatalogError> {
        let mut client = self.inner.clone();
        let resp = client
            .get_package(GetPackageRequest { id: id.to_owned() })
            .await
            .map_err(transport("GetPackage"))?
            .into_inner();
        ensure_ok(resp.status.as_ref())?;
        resp.package.ok_or_else(|| missing_package("GetPackage"))
    }

    async fn list_packages(&self, req: GetPackagesRequest) -> Result<Page<Package>, CatalogError> {
        let mut client = self.inner.clone();
        let resp = client
            .get_packages(req)
            .await
            .map_err(transport("GetPackages"))?
            .into_inner();
        ensure_ok(resp.status.as_ref())?;
        Ok(Page {
            items: resp.packages,
            total: resp.total,
        })
    }

    async fn update_package(&self, req: UpdatePackageRequest) -> Result<Package, CatalogError> {
        let mut client = self.inner.clone();
        let resp = client
            .update_package(req)
            .await
            .map_err(transport("UpdatePackage"))?
            .into_inner();
        ensure_ok(resp.status.as_ref())?;
        resp.package.ok_or_else(|| missing_package("UpdatePackage"))
    }

    async fn list_tags(&self, req: GetTagsRequest) -> Result<Page<Tag>, CatalogError> {
        let mut client = self.inner.clone();
        let resp = client
            .get_tags(req)
            .await
            .map_err(transport("GetTags"))?
            .into_inner();
        ensure_ok(resp.status.as_ref())?;
        Ok(Page {
            items: resp.tags,
            total: resp.total,
        })
    }
}
