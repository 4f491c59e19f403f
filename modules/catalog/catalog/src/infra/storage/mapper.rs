use sea_orm::ActiveValue::{NotSet, Set};

use super::entity::{package, tag};
use crate::domain::model::{Package, Tag};

impl From<tag::Model> for Tag {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            is_show: m.is_show,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        }
    }
}

pub fn tag_active(t: &Tag) -> tag::ActiveModel {
    tag::ActiveModel {
        id: Set(t.id.clone()),
        user_id: Set(t.user_id.clone()),
        name: Set(t.name.clone()),
        is_show: Set(t.is_show),
        created_at: Set(t.created_at),
        updated_at: Set(t.updated_at),
        deleted_at: Set(t.deleted_at),
    }
}

impl From<package::Model> for Package {
    fn from(m: package::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            summary: m.summary,
            description: m.description,
            link: m.link,
            cover: m.cover,
            version: m.version,
            last_updated_at: m.last_updated_at,
            view_count: u32::try_from(m.view_count.max(0)).unwrap_or(u32::MAX),
            is_public: m.is_public,
            created_at: m.created_at,
            updated_at: m.updated_at,
            tags: Vec::new(),
            owner: None,
        }
    }
}

/// Every column, for inserts.
pub fn package_active(p: &Package) -> package::ActiveModel {
    package::ActiveModel {
        view_count: Set(i64::from(p.view_count)),
        created_at: Set(p.created_at),
        deleted_at: Set(None),
        ..package_changes(p)
    }
}

/// Only the caller-mutable columns plus `updated_at`, for updates.
pub fn package_changes(p: &Package) -> package::ActiveModel {
    package::ActiveModel {
        id: Set(p.id.clone()),
        user_id: Set(p.user_id.clone()),
        name: Set(p.name.clone()),
        summary: Set(p.summary.clone()),
        description: Set(p.description.clone()),
        link: Set(p.link.clone()),
        cover: Set(p.cover.clone()),
        version: Set(p.version.clone()),
        last_updated_at: Set(p.last_updated_at),
        view_count: NotSet,
        is_public: Set(p.is_public),
        created_at: NotSet,
        updated_at: Set(p.updated_at),
        deleted_at: NotSet,
    }
}
