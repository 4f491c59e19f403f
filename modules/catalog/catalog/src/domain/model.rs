use identity_sdk::UserIdentity;
use time::OffsetDateTime;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Highest page whose row offset still fits a signed 64-bit `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX.unsigned_abs() / MAX_LIMIT;

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: String,
    /// Owning user. Always set, even when the identity cannot be resolved.
    pub user_id: String,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub link: String,
    pub cover: String,
    pub version: String,
    /// Caller-supplied, distinct from the audit timestamps.
    pub last_updated_at: OffsetDateTime,
    pub view_count: u32,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Visible tags only.
    pub tags: Vec<Tag>,
    /// Embedded read-only copy of the owner's profile, when resolved.
    pub owner: Option<UserIdentity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    /// User who first coined the tag.
    pub user_id: String,
    pub name: String,
    pub is_show: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

impl Tag {
    /// A freshly coined, visible tag.
    #[must_use]
    pub fn coined(owner_id: &str, name: &str, now: OffsetDateTime) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            user_id: owner_id.to_owned(),
            name: name.to_owned(),
            is_show: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Caller input for create and update, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDraft {
    pub name: String,
    pub link: String,
    pub summary: String,
    pub description: String,
    pub cover: String,
    pub version: String,
    pub last_updated_at: String,
    pub tag_names: Vec<String>,
    /// `None` means public on create and unchanged on update.
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    /// Most viewed first.
    Hot,
    /// Most recently created first.
    Newest,
    /// Insertion order.
    #[default]
    Default,
}

impl Category {
    /// Unknown categories fall back to insertion order.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "hot" => Self::Hot,
            "newest" => Self::Newest,
            _ => Self::Default,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    pub category: Category,
    /// Case-sensitive substring of the package name.
    pub name: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub package_id: Option<String>,
    pub name: Option<String>,
}

/// Normalized pagination: `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// `page <= 0` becomes 1, `limit <= 0` becomes the default, and values
    /// above [`MAX_PAGE`] / [`MAX_LIMIT`] are capped.
    #[must_use]
    pub fn normalize(page: i64, limit: i64) -> Self {
        let page = u64::try_from(page)
            .ok()
            .filter(|p| *p > 0)
            .map_or(DEFAULT_PAGE, |p| p.min(MAX_PAGE));
        let limit = u64::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .map_or(DEFAULT_LIMIT, |l| l.min(MAX_LIMIT));
        Self { page, limit }
    }

    /// Zero-based page index for the storage paginator.
    #[must_use]
    pub fn index(self) -> u64 {
        self.page.saturating_sub(1)
    }

    /// Rows skipped before this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        self.index().saturating_mul(self.limit)
    }

    /// Whether this page starts before the end of `total` rows.
    #[must_use]
    pub fn within(self, total: u64) -> bool {
        self.offset() < total
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Trim, drop blanks and collapse duplicates, keeping first-seen order.
#[must_use]
pub fn normalize_tag_names(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !out.iter().any(|seen| seen == name) {
            out.push(name.to_owned());
        }
    }
    out
}
