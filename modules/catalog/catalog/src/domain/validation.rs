//! Input rules for create and update. Lengths count characters, not bytes.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::domain::error::DomainError;
use crate::domain::model::{PackageDraft, normalize_tag_names};

pub const MAX_NAME: usize = 100;
pub const MAX_LINK: usize = 100;
pub const MAX_SUMMARY: usize = 200;
pub const MAX_DESCRIPTION: usize = 10_000;
pub const MAX_COVER: usize = 255;
pub const MAX_VERSION: usize = 64;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_NAME: usize = 100;
pub const MAX_USER_ID: usize = 64;

/// A draft that passed validation, with its timestamp parsed and tag
/// names normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub name: String,
    pub link: String,
    pub summary: String,
    pub description: String,
    pub cover: String,
    pub version: String,
    pub last_updated_at: OffsetDateTime,
    pub tag_names: Vec<String>,
    pub is_public: Option<bool>,
}

fn required(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::required(field));
    }
    Ok(())
}

fn max_chars(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "The {field} may not be greater than {max} characters."
        )));
    }
    Ok(())
}

/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM:SS` (taken as UTC).
///
/// # Errors
/// Returns a validation error when neither format matches.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, DomainError> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| DomainError::validation("The last_updated_at is not a valid date."))
}

/// Check a create/update draft on behalf of `owner_id`.
///
/// # Errors
/// Returns the first violated rule as a validation error.
pub fn validate_draft(owner_id: &str, draft: &PackageDraft) -> Result<ValidDraft, DomainError> {
    required("user_id", owner_id)?;
    max_chars("user_id", owner_id, MAX_USER_ID)?;

    required("name", &draft.name)?;
    max_chars("name", &draft.name, MAX_NAME)?;

    required("url", &draft.link)?;
    max_chars("url", &draft.link, MAX_LINK)?;

    max_chars("summary", &draft.summary, MAX_SUMMARY)?;
    max_chars("description", &draft.description, MAX_DESCRIPTION)?;
    max_chars("cover", &draft.cover, MAX_COVER)?;
    max_chars("version", &draft.version, MAX_VERSION)?;

    let tag_names = normalize_tag_names(&draft.tag_names);
    if tag_names.len() > MAX_TAGS {
        return Err(DomainError::validation(format!(
            "The tags may not have more than {MAX_TAGS} items."
        )));
    }
    if tag_names.iter().any(|t| t.chars().count() > MAX_TAG_NAME) {
        return Err(DomainError::validation(format!(
            "Each tag may not be greater than {MAX_TAG_NAME} characters."
        )));
    }

    required("last_updated_at", &draft.last_updated_at)?;
    let last_updated_at = parse_timestamp(&draft.last_updated_at)?;

    Ok(ValidDraft {
        name: draft.name.clone(),
        link: draft.link.clone(),
        summary: draft.summary.clone(),
        description: draft.description.clone(),
        cover: draft.cover.clone(),
        version: draft.version.clone(),
        last_updated_at,
        tag_names,
        is_public: draft.is_public,
    })
}
