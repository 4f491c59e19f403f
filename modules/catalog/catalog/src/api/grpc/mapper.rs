//! Conversions between `market.catalog.v1` messages and domain types.

use catalog_sdk::proto;
use market_transport_grpc::Pagination;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::model::{
    Category, Package, PackageDraft, PackageFilter, PageRequest, Tag, TagFilter,
};

fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_default()
}

fn non_empty(raw: String) -> Option<String> {
    if raw.is_empty() { None } else { Some(raw) }
}

pub fn page_request(pagination: Option<&Pagination>) -> PageRequest {
    pagination.map_or_else(
        || PageRequest::normalize(0, 0),
        |p| PageRequest::normalize(p.page, p.limit),
    )
}

pub fn total(total: u64) -> i64 {
    i64::try_from(total).unwrap_or(i64::MAX)
}

pub fn tag_to_proto(tag: Tag) -> proto::Tag {
    proto::Tag {
        id: tag.id,
        user_id: tag.user_id,
        name: tag.name,
        created_at: rfc3339(tag.created_at),
        updated_at: rfc3339(tag.updated_at),
        deleted_at: tag.deleted_at.map(rfc3339).unwrap_or_default(),
    }
}

pub fn package_to_proto(p: Package) -> proto::Package {
    proto::Package {
        id: p.id,
        user_id: p.user_id,
        name: p.name,
        summary: p.summary,
        description: p.description,
        link: p.link,
        version: p.version,
        last_updated_at: rfc3339(p.last_updated_at),
        created_at: rfc3339(p.created_at),
        updated_at: rfc3339(p.updated_at),
        user: p.owner.map(Into::into),
        tags: p.tags.into_iter().map(tag_to_proto).collect(),
        view_count: p.view_count,
        cover: p.cover,
        is_public: p.is_public,
    }
}

pub fn create_draft(req: proto::CreatePackageRequest) -> (String, PackageDraft) {
    let draft = PackageDraft {
        name: req.name,
        link: req.url,
        summary: req.summary,
        description: req.description,
        cover: req.cover,
        version: req.version,
        last_updated_at: req.last_updated_at,
        tag_names: req.tags,
        is_public: req.is_public,
    };
    (req.user_id, draft)
}

/// Returns `(package_id, actor_id, draft)`.
pub fn update_draft(req: proto::UpdatePackageRequest) -> (String, String, PackageDraft) {
    let draft = PackageDraft {
        name: req.name,
        link: req.url,
        summary: req.summary,
        description: req.description,
        cover: req.cover,
        version: req.version,
        last_updated_at: req.last_updated_at,
        tag_names: req.tags,
        is_public: req.is_public,
    };
    (req.id, req.user_id, draft)
}

pub fn package_filter(query: Option<proto::PackagesQuery>) -> PackageFilter {
    let query = query.unwrap_or_default();
    PackageFilter {
        category: Category::parse(&query.category),
        name: non_empty(query.name),
        owner_id: non_empty(query.user_id),
    }
}

pub fn tag_filter(query: Option<proto::TagsQuery>) -> TagFilter {
    let query = query.unwrap_or_default();
    TagFilter {
        package_id: non_empty(query.package_id),
        name: non_empty(query.name),
    }
}
