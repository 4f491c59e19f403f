use std::collections::HashMap;
use std::future::Future;
use std::slice;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

use super::entity::{package, package_tag, tag};
use super::mapper::{package_active, package_changes, tag_active};
use crate::domain::model::{Category, Package, PackageFilter, Page, PageRequest, Tag, TagFilter};
use crate::domain::repo::{CatalogStore, StoreError};

/// sea-orm implementation of [`CatalogStore`]. Each call is bounded by
/// `query_timeout`, independent of the caller's own deadline.
#[derive(Clone)]
pub struct SeaOrmCatalogStore {
    db: DatabaseConnection,
    query_timeout: Duration,
}

impl SeaOrmCatalogStore {
    #[must_use]
    pub fn new(db: DatabaseConnection, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(result) => result.map_err(|e| store_err(op, &e)),
            Err(_) => {
                tracing::warn!(op, timeout = ?self.query_timeout, "store call timed out");
                Err(StoreError::Timeout(self.query_timeout))
            }
        }
    }
}

fn store_err(op: &'static str, e: &DbErr) -> StoreError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return StoreError::Conflict(e.to_string());
    }
    tracing::error!(op, error = %e, "store call failed");
    StoreError::Backend(format!("{op}: {e}"))
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-sensitive substring match. SQLite's LIKE folds ASCII case, so it
/// uses `instr` instead.
fn contains_exact<C: ColumnTrait>(backend: DatabaseBackend, column: C, needle: &str) -> SimpleExpr {
    match backend {
        DatabaseBackend::Sqlite => Expr::cust_with_values(
            format!("instr(\"{}\", ?) > 0", column.as_str()),
            [needle.to_owned()],
        ),
        DatabaseBackend::Postgres | DatabaseBackend::MySql => Expr::col(column)
            .like(LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\')),
    }
}

/// Visible, live tags for each of `package_ids`, ordered by name.
async fn visible_tags_for<C: ConnectionTrait>(
    conn: &C,
    package_ids: &[String],
) -> Result<HashMap<String, Vec<Tag>>, DbErr> {
    let mut grouped: HashMap<String, Vec<Tag>> = HashMap::new();
    if package_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = package_tag::Entity::find()
        .find_also_related(tag::Entity)
        .filter(package_tag::Column::PackageId.is_in(package_ids.iter().cloned()))
        .filter(tag::Column::IsShow.eq(true))
        .filter(tag::Column::DeletedAt.is_null())
        .order_by_asc(tag::Column::Name)
        .all(conn)
        .await?;

    for (link, tag) in rows {
        if let Some(tag) = tag {
            grouped.entry(link.package_id).or_default().push(tag.into());
        }
    }
    Ok(grouped)
}

#[async_trait]
impl CatalogStore for SeaOrmCatalogStore {
    async fn insert_package(&self, package: &Package) -> Result<(), StoreError> {
        self.bounded("insert_package", async {
            package::Entity::insert(package_active(package))
                .exec_without_returning(&self.db)
                .await
                .map(|_| ())
        })
        .await
    }

    async fn update_package(&self, package: &Package) -> Result<(), StoreError> {
        self.bounded("update_package", async {
            package_changes(package).update(&self.db).await.map(|_| ())
        })
        .await
    }

    async fn find_package(&self, id: &str) -> Result<Option<Package>, StoreError> {
        self.bounded("find_package", async {
            let Some(row) = package::Entity::find_by_id(id.to_owned())
                .filter(package::Column::DeletedAt.is_null())
                .one(&self.db)
                .await?
            else {
                return Ok(None);
            };

            let mut tags = visible_tags_for(&self.db, slice::from_ref(&row.id)).await?;
            let mut found = Package::from(row);
            found.tags = tags.remove(&found.id).unwrap_or_default();
            Ok(Some(found))
        })
        .await
    }

    async fn list_packages(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> Result<Page<Package>, StoreError> {
        let backend = self.db.get_database_backend();

        let mut query = package::Entity::find()
            .filter(package::Column::DeletedAt.is_null())
            .filter(package::Column::IsPublic.eq(true));
        if let Some(owner) = filter.owner_id.as_deref().filter(|o| !o.is_empty()) {
            query = query.filter(package::Column::UserId.eq(owner));
        }
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(contains_exact(backend, package::Column::Name, name));
        }
        query = match filter.category {
            Category::Hot => query.order_by_desc(package::Column::ViewCount),
            Category::Newest => query.order_by_desc(package::Column::CreatedAt),
            Category::Default => query,
        };
        let query = query.order_by_asc(package::Column::Id);

        self.bounded("list_packages", async {
            let paginator = query.paginate(&self.db, page.limit);
            let total = paginator.num_items().await?;
            if !page.within(total) {
                return Ok(Page { items: Vec::new(), total });
            }
            let rows = paginator.fetch_page(page.index()).await?;

            let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
            let mut tags = visible_tags_for(&self.db, &ids).await?;

            let items = rows
                .into_iter()
                .map(|row| {
                    let mut p = Package::from(row);
                    p.tags = tags.remove(&p.id).unwrap_or_default();
                    p
                })
                .collect();
            Ok(Page { items, total })
        })
        .await
    }

    async fn find_tags_by_names(&self, names: &[String]) -> Result<Vec<Tag>, StoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.bounded("find_tags_by_names", async {
            let rows = tag::Entity::find()
                .filter(tag::Column::Name.is_in(names.iter().cloned()))
                .filter(tag::Column::DeletedAt.is_null())
                .all(&self.db)
                .await?;
            Ok(rows.into_iter().map(Tag::from).collect())
        })
        .await
    }

    async fn insert_tags(&self, tags: &[Tag]) -> Result<(), StoreError> {
        if tags.is_empty() {
            return Ok(());
        }
        self.bounded("insert_tags", async {
            tag::Entity::insert_many(tags.iter().map(tag_active))
                .exec_without_returning(&self.db)
                .await
                .map(|_| ())
        })
        .await
    }

    async fn replace_package_tags(
        &self,
        package_id: &str,
        tag_ids: &[String],
    ) -> Result<(), StoreError> {
        self.bounded("replace_package_tags", async {
            let txn = self.db.begin().await?;

            package_tag::Entity::delete_many()
                .filter(package_tag::Column::PackageId.eq(package_id))
                .exec(&txn)
                .await?;

            if !tag_ids.is_empty() {
                let links = tag_ids.iter().map(|tag_id| package_tag::ActiveModel {
                    package_id: Set(package_id.to_owned()),
                    tag_id: Set(tag_id.clone()),
                });
                package_tag::Entity::insert_many(links)
                    .exec_without_returning(&txn)
                    .await?;
            }

            txn.commit().await
        })
        .await
    }

    async fn list_tags(&self, filter: &TagFilter, page: PageRequest) -> Result<Page<Tag>, StoreError> {
        let backend = self.db.get_database_backend();

        let mut query = tag::Entity::find()
            .filter(tag::Column::IsShow.eq(true))
            .filter(tag::Column::DeletedAt.is_null());
        if let Some(package_id) = filter.package_id.as_deref().filter(|p| !p.is_empty()) {
            query = query.filter(
                tag::Column::Id.in_subquery(
                    Query::select()
                        .column(package_tag::Column::TagId)
                        .from(package_tag::Entity)
                        .and_where(package_tag::Column::PackageId.eq(package_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(contains_exact(backend, tag::Column::Name, name));
        }
        let query = query
            .order_by_asc(tag::Column::Name)
            .order_by_asc(tag::Column::Id);

        self.bounded("list_tags", async {
            let paginator = query.paginate(&self.db, page.limit);
            let total = paginator.num_items().await?;
            if !page.within(total) {
                return Ok(Page { items: Vec::new(), total });
            }
            let rows = paginator.fetch_page(page.index()).await?;
            Ok(Page {
                items: rows.into_iter().map(Tag::from).collect(),
                total,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
