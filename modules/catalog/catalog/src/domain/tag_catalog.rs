use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::model::{Page, PageRequest, Tag, TagFilter};
use crate::domain::repo::CatalogStore;

/// Read side of the tag vocabulary.
pub struct TagCatalog {
    store: Arc<dyn CatalogStore>,
}

impl TagCatalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all, fields(page = page.page, limit = page.limit))]
    pub async fn list(&self, filter: &TagFilter, page: PageRequest) -> Result<Page<Tag>, DomainError> {
        Ok(self.store.list_tags(filter, page).await?)
    }
}
