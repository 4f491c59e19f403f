//! Tag reconciliation: map free-text names onto canonical tag records,
//! coining only the names that do not exist yet.

use std::collections::HashMap;
use std::slice;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::model::{Tag, normalize_tag_names};
use crate::domain::repo::{CatalogStore, StoreError};

#[derive(Clone)]
pub struct TagReconciler {
    store: Arc<dyn CatalogStore>,
}

impl TagReconciler {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Attach exactly the tags named in `candidates` to `package_id`.
    ///
    /// Returns the final tag set in the order the names were given. An
    /// empty (or all-blank) candidate list is a no-op: the existing
    /// association is left untouched and an empty set is returned.
    #[instrument(skip_all, fields(package_id = %package_id, owner_id = %owner_id))]
    pub async fn reconcile(
        &self,
        owner_id: &str,
        package_id: &str,
        candidates: &[String],
    ) -> Result<Vec<Tag>, DomainError> {
        let names = normalize_tag_names(candidates);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_name: HashMap<String, Tag> = self
            .store
            .find_tags_by_names(&names)
            .await?
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();

        let now = OffsetDateTime::now_utc();
        let fresh: Vec<Tag> = names
            .iter()
            .filter(|n| !by_name.contains_key(n.as_str()))
            .map(|n| Tag::coined(owner_id, n, now))
            .collect();

        if !fresh.is_empty() {
            for tag in self.create_missing(fresh).await? {
                by_name.insert(tag.name.clone(), tag);
            }
        }

        let mut resolved = Vec::with_capacity(names.len());
        for name in &names {
            let tag = by_name.remove(name).ok_or_else(|| {
                StoreError::Backend(format!("tag '{name}' vanished during reconciliation"))
            })?;
            resolved.push(tag);
        }

        let ids: Vec<String> = resolved.iter().map(|t| t.id.clone()).collect();
        self.store.replace_package_tags(package_id, &ids).await?;

        tracing::debug!(tags = resolved.len(), "package tags reconciled");
        Ok(resolved)
    }

    /// Bulk-insert `fresh`. If a concurrent writer coined one of the names
    /// first, fall back to one insert per name and treat each conflict as
    /// "already exists": the winner's row is looked up and used instead.
    async fn create_missing(&self, fresh: Vec<Tag>) -> Result<Vec<Tag>, DomainError> {
        match self.store.insert_tags(&fresh).await {
            Ok(()) => return Ok(fresh),
            Err(StoreError::Conflict(detail)) => {
                tracing::info!(%detail, "tag creation raced with another writer, resolving per name");
            }
            Err(e) => return Err(e.into()),
        }

        let mut created = Vec::with_capacity(fresh.len());
        let mut lost = Vec::new();
        for tag in fresh {
            match self.store.insert_tags(slice::from_ref(&tag)).await {
                Ok(()) => created.push(tag),
                Err(StoreError::Conflict(_)) => lost.push(tag.name),
                Err(e) => return Err(e.into()),
            }
        }

        if !lost.is_empty() {
            let winners = self.store.find_tags_by_names(&lost).await?;
            created.extend(winners);
        }
        Ok(created)
    }
}
