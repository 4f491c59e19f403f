//! Package create/get/list/update, enriched with owner identities.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use identity_sdk::{IdentityClient, UserIdentity};
use time::OffsetDateTime;
use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::model::{Package, PackageDraft, PackageFilter, Page, PageRequest, Tag};
use crate::domain::repo::CatalogStore;
use crate::domain::tags::TagReconciler;
use crate::domain::validation::validate_draft;

pub struct PackageAggregator {
    store: Arc<dyn CatalogStore>,
    identity: Arc<dyn IdentityClient>,
    tags: TagReconciler,
}

impl PackageAggregator {
    pub fn new(store: Arc<dyn CatalogStore>, identity: Arc<dyn IdentityClient>) -> Self {
        Self {
            tags: TagReconciler::new(store.clone()),
            store,
            identity,
        }
    }

    /// Validate, persist, then attach tags.
    ///
    /// The package row is written before any tag work starts. If tag
    /// reconciliation fails afterwards the package stays persisted and the
    /// error is returned; callers may retry with an update.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn create(&self, owner_id: &str, draft: PackageDraft) -> Result<Package, DomainError> {
        let valid = validate_draft(owner_id, &draft)?;
        let now = OffsetDateTime::now_utc();

        let mut package = Package {
            id: uuid::Uuid::now_v7().to_string(),
            user_id: owner_id.to_owned(),
            name: valid.name,
            summary: valid.summary,
            description: valid.description,
            link: valid.link,
            cover: valid.cover,
            version: valid.version,
            last_updated_at: valid.last_updated_at,
            view_count: 0,
            is_public: valid.is_public.unwrap_or(true),
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            owner: None,
        };
        self.store.insert_package(&package).await?;
        tracing::info!(package_id = %package.id, "package created");

        if !valid.tag_names.is_empty() {
            package.tags = visible(
                self.tags
                    .reconcile(owner_id, &package.id, &valid.tag_names)
                    .await?,
            );
        }
        Ok(package)
    }

    /// Detail view: the owner's identity must resolve or the call fails.
    #[instrument(skip_all, fields(package_id = %id))]
    pub async fn get(&self, id: &str) -> Result<Package, DomainError> {
        if id.is_empty() {
            return Err(DomainError::required("id"));
        }
        let mut package = self
            .store
            .find_package(id)
            .await?
            .ok_or_else(DomainError::package_not_found)?;

        let owner = self.identity.get_by_id(&package.user_id).await.map_err(|e| {
            tracing::warn!(error = %e, owner_id = %package.user_id, "owner lookup failed");
            e
        })?;
        package.owner = Some(owner);
        Ok(package)
    }

    /// List view: one batched identity lookup for all owners on the page.
    /// A failed batch fails the whole call; owners the identity service
    /// does not know are left empty.
    #[instrument(skip_all, fields(page = page.page, limit = page.limit))]
    pub async fn list(&self, filter: &PackageFilter, page: PageRequest) -> Result<Page<Package>, DomainError> {
        let mut result = self.store.list_packages(filter, page).await?;
        if result.items.is_empty() {
            return Ok(result);
        }

        let mut seen = HashSet::new();
        let owner_ids: Vec<String> = result
            .items
            .iter()
            .filter(|p| seen.insert(p.user_id.as_str()))
            .map(|p| p.user_id.clone())
            .collect();

        let owners: HashMap<String, UserIdentity> = self
            .identity
            .get_by_ids(&owner_ids)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, owners = owner_ids.len(), "batch owner lookup failed");
                e
            })?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        for package in &mut result.items {
            package.owner = owners.get(&package.user_id).cloned();
        }
        Ok(result)
    }

    /// Owner-only overwrite of the mutable fields. Tags are reconciled only
    /// when the draft names at least one, and visibility only changes when
    /// the draft sets it; otherwise both stay as they were.
    #[instrument(skip_all, fields(package_id = %id, actor_id = %actor_id))]
    pub async fn update(&self, actor_id: &str, id: &str, draft: PackageDraft) -> Result<Package, DomainError> {
        if id.is_empty() {
            return Err(DomainError::required("id"));
        }
        let valid = validate_draft(actor_id, &draft)?;

        let mut package = self
            .store
            .find_package(id)
            .await?
            .ok_or_else(DomainError::package_not_found)?;

        if package.user_id != actor_id {
            tracing::warn!(owner_id = %package.user_id, "update rejected: actor is not the owner");
            return Err(DomainError::forbidden_update());
        }

        package.name = valid.name;
        package.link = valid.link;
        package.summary = valid.summary;
        package.description = valid.description;
        package.cover = valid.cover;
        package.version = valid.version;
        package.last_updated_at = valid.last_updated_at;
        if let Some(is_public) = valid.is_public {
            package.is_public = is_public;
        }
        package.updated_at = OffsetDateTime::now_utc();

        self.store.update_package(&package).await?;
        tracing::info!("package updated");

        if !valid.tag_names.is_empty() {
            package.tags = visible(
                self.tags
                    .reconcile(actor_id, &package.id, &valid.tag_names)
                    .await?,
            );
        }
        Ok(package)
    }
}

fn visible(mut tags: Vec<Tag>) -> Vec<Tag> {
    tags.retain(|t| t.is_show);
    tags
}
