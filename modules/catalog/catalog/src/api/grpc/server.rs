use std::sync::Arc;

use catalog_sdk::PackageService;
use catalog_sdk::proto::{
    CreatePackageRequest, CreatePackageResponse, GetPackageRequest, GetPackageResponse,
    GetPackagesRequest, GetPackagesResponse, GetTagsRequest, GetTagsResponse,
    UpdatePackageRequest, UpdatePackageResponse,
};
use market_transport_grpc::respond;
use tonic::{Request, Response, Status};

use super::mapper;
use crate::domain::packages::PackageAggregator;
use crate::domain::tag_catalog::TagCatalog;

/// `PackageService` adapter. Domain errors never escape as transport
/// errors; [`respond`] folds them into the status envelope.
#[derive(Clone)]
pub struct PackageServiceImpl {
    packages: Arc<PackageAggregator>,
    tags: Arc<TagCatalog>,
}

impl PackageServiceImpl {
    pub fn new(packages: Arc<PackageAggregator>, tags: Arc<TagCatalog>) -> Self {
        Self { packages, tags }
    }
}

#[tonic::async_trait]
impl PackageService for PackageServiceImpl {
    async fn create_package(
        &self,
        request: Request<CreatePackageRequest>,
    ) -> Result<Response<CreatePackageResponse>, Status> {
        let req = request.into_inner();
        let (owner_id, draft) = mapper::create_draft(req.clone());
        let result = self
            .packages
            .create(&owner_id, draft)
            .await
            .map(|p| CreatePackageResponse {
                status: None,
                package: Some(mapper::package_to_proto(p)),
            });
        respond("CreatePackage", &req, result)
    }

    async fn get_package(
        &self,
        request: Request<GetPackageRequest>,
    ) -> Result<Response<GetPackageResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .packages
            .get(&req.id)
            .await
            .map(|p| GetPackageResponse {
                status: None,
                package: Some(mapper::package_to_proto(p)),
            });
        respond("GetPackage", &req, result)
    }

    async fn get_packages(
        &self,
        request: Request<GetPackagesRequest>,
    ) -> Result<Response<GetPackagesResponse>, Status> {
        let req = request.into_inner();
        let filter = mapper::package_filter(req.query.clone());
        let page = mapper::page_request(req.pagination.as_ref());
        let result = self
            .packages
            .list(&filter, page)
            .await
            .map(|page| GetPackagesResponse {
                status: None,
                total: mapper::total(page.total),
                packages: page.items.into_iter().map(mapper::package_to_proto).collect(),
            });
        respond("GetPackages", &req, result)
    }

    async fn update_package(
        &self,
        request: Request<UpdatePackageRequest>,
    ) -> Result<Response<UpdatePackageResponse>, Status> {
        let req = request.into_inner();
        let (id, actor_id, draft) = mapper::update_draft(req.clone());
        let result = self
            .packages
            .update(&actor_id, &id, draft)
            .await
            .map(|p| UpdatePackageResponse {
                status: None,
                package: Some(mapper::package_to_proto(p)),
            });
        respond("UpdatePackage", &req, result)
    }

    async fn get_tags(
        &self,
        request: Request<GetTagsRequest>,
    ) -> Result<Response<GetTagsResponse>, Status> {
        let req = request.into_inner();
        let filter = mapper::tag_filter(req.query.clone());
        let page = mapper::page_request(req.pagination.as_ref());
        let result = self.tags.list(&filter, page).await.map(|page| GetTagsResponse {
            status: None,
            total: mapper::total(page.total),
            tags: page.items.into_iter().map(mapper::tag_to_proto).collect(),
        });
        respond("GetTags", &req, result)
    }
}
