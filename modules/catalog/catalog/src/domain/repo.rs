use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::model::{Package, PackageFilter, Page, PageRequest, Tag, TagFilter};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("store call exceeded {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Backend(String),
}

/// Persistence boundary shared by the tag reconciler and the package
/// aggregator. Every read skips soft-deleted rows.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a new package. `tags` and `owner` are ignored.
    async fn insert_package(&self, package: &Package) -> Result<(), StoreError>;

    /// Overwrite the mutable columns of an existing package.
    async fn update_package(&self, package: &Package) -> Result<(), StoreError>;

    /// Load a package with its visible tags; `owner` is left empty.
    async fn find_package(&self, id: &str) -> Result<Option<Package>, StoreError>;

    /// Filtered, ordered page of public packages with their visible tags.
    async fn list_packages(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> Result<Page<Package>, StoreError>;

    /// Exact, case-sensitive name match in a single round-trip.
    async fn find_tags_by_names(&self, names: &[String]) -> Result<Vec<Tag>, StoreError>;

    /// Insert all tags or none. A name collision yields
    /// [`StoreError::Conflict`].
    async fn insert_tags(&self, tags: &[Tag]) -> Result<(), StoreError>;

    /// Replace the full association set of a package atomically.
    async fn replace_package_tags(
        &self,
        package_id: &str,
        tag_ids: &[String],
    ) -> Result<(), StoreError>;

    /// Visible tags, optionally restricted to one package and a name
    /// substring, ordered by name.
    async fn list_tags(&self, filter: &TagFilter, page: PageRequest)
    -> Result<Page<Tag>, StoreError>;
}
