//! JSON shapes of the HTTP surface. Bodies are camelCase, query strings
//! keep the snake_case names of the catalog query messages.

use catalog_sdk::proto::{
    CreatePackageRequest, GetPackagesRequest, GetTagsRequest, PackagesQuery, TagsQuery,
    UpdatePackageRequest,
};
use catalog_sdk::{Package, Tag};
use identity_sdk::{LoginOutcome, ProfileUpdate, User, UserIdentity};
use market_transport_grpc::Pagination;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub summary: String,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
            summary: u.summary,
        }
    }
}

impl From<UserIdentity> for UserView {
    fn from(u: UserIdentity) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
            summary: u.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
}

impl From<Tag> for TagView {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            name: t.name,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub link: String,
    pub cover: String,
    pub version: String,
    pub last_updated_at: String,
    pub created_at: String,
    pub updated_at: String,
    pub view_count: u32,
    pub is_public: bool,
    pub tags: Vec<TagView>,
    /// Absent when the owner could not be resolved.
    pub user: Option<UserView>,
}

impl From<Package> for PackageView {
    fn from(p: Package) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            name: p.name,
            summary: p.summary,
            description: p.description,
            link: p.link,
            cover: p.cover,
            version: p.version,
            last_updated_at: p.last_updated_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
            view_count: p.view_count,
            is_public: p.is_public,
            tags: p.tags.into_iter().map(TagView::from).collect(),
            user: p.user.map(UserView::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Body of `POST /packages` and `PUT /packages/{id}`. The owner is never
/// taken from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageInput {
    pub name: String,
    pub url: String,
    pub cover: String,
    pub summary: String,
    pub description: String,
    pub version: String,
    pub last_updated_at: String,
    pub tags: Vec<String>,
    /// Unset means public on create and unchanged on update.
    pub is_public: Option<bool>,
}

impl PackageInput {
    #[must_use]
    pub fn into_create(self, owner_id: String) -> CreatePackageRequest {
        CreatePackageRequest {
            user_id: owner_id,
            name: self.name,
            cover: self.cover,
            url: self.url,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            version: self.version,
            last_updated_at: self.last_updated_at,
            is_public: self.is_public,
        }
    }

    #[must_use]
    pub fn into_update(self, id: String, actor_id: String) -> UpdatePackageRequest {
        UpdatePackageRequest {
            id,
            user_id: actor_id,
            name: self.name,
            url: self.url,
            summary: self.summary,
            description: self.description,
            cover: self.cover,
            version: self.version,
            last_updated_at: self.last_updated_at,
            tags: self.tags,
            is_public: self.is_public,
        }
    }
}

/// Body of `POST /user/email/login`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginView {
    pub user: UserView,
    pub token: String,
}

impl From<LoginOutcome> for LoginView {
    fn from(o: LoginOutcome) -> Self {
        Self {
            user: o.user.into(),
            token: o.token,
        }
    }
}

/// Body of `PUT /users/{id}`. An absent or empty password keeps the
/// current one.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub name: String,
    pub avatar: String,
    pub summary: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for ProfileInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileInput")
            .field("name", &self.name)
            .field("avatar", &self.avatar)
            .field("summary", &self.summary)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProfileInput {
    #[must_use]
    pub fn into_update(self, id: String, actor_id: String) -> ProfileUpdate {
        ProfileUpdate {
            id,
            actor_id,
            name: self.name,
            avatar: self.avatar,
            summary: self.summary,
            password: self.password.filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListPackagesParams {
    pub page: i64,
    pub limit: i64,
    pub category: String,
    pub name: String,
    pub user_id: String,
}

impl From<ListPackagesParams> for GetPackagesRequest {
    fn from(p: ListPackagesParams) -> Self {
        Self {
            pagination: Some(Pagination {
                page: p.page,
                limit: p.limit,
            }),
            query: Some(PackagesQuery {
                category: p.category,
                name: p.name,
                user_id: p.user_id,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListTagsParams {
    pub page: i64,
    pub limit: i64,
    pub package_id: String,
    pub name: String,
}

impl From<ListTagsParams> for GetTagsRequest {
    fn from(p: ListTagsParams) -> Self {
        Self {
            pagination: Some(Pagination {
                page: p.page,
                limit: p.limit,
            }),
            query: Some(TagsQuery {
                package_id: p.package_id,
                name: p.name,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn package_json_is_camel_case() {
        let view = PackageView::from(Package {
            id: "p1".to_owned(),
            user_id: "u1".to_owned(),
            last_updated_at: "2024-01-01T00:00:00Z".to_owned(),
            view_count: 3,
            is_public: true,
            ..Package::default()
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["lastUpdatedAt"], "2024-01-01T00:00:00Z");
        assert_eq!(json["viewCount"], 3);
        assert_eq!(json["isPublic"], true);
        assert!(json["user"].is_null());
    }

    #[test]
    fn input_ignores_unknown_owner_fields() {
        let input: PackageInput =
            serde_json::from_str(r#"{"name":"lib","url":"https://x","userId":"mallory","tags":["go"]}"#)
                .unwrap();
        let req = input.into_create("1".to_owned());
        assert_eq!(req.user_id, "1");
        assert_eq!(req.tags, ["go"]);
        assert_eq!(req.is_public, None);
    }

    #[test]
    fn visibility_is_forwarded_only_when_given() {
        let input: PackageInput = serde_json::from_str(r#"{"name":"lib","isPublic":false}"#).unwrap();
        assert_eq!(input.clone().into_create("1".to_owned()).is_public, Some(false));
        assert_eq!(
            input.into_update("p1".to_owned(), "1".to_owned()).is_public,
            Some(false)
        );

        let unset: PackageInput = serde_json::from_str(r#"{"name":"lib"}"#).unwrap();
        assert_eq!(unset.into_update("p1".to_owned(), "1".to_owned()).is_public, None);
    }

    #[test]
    fn empty_password_keeps_the_current_one() {
        let input: ProfileInput = serde_json::from_str(r#"{"name":"Ada","password":""}"#).unwrap();
        let update = input.into_update("1".to_owned(), "1".to_owned());
        assert_eq!(update.password, None);
        assert_eq!(update.name, "Ada");
    }

    #[test]
    fn credentials_stay_out_of_debug_output() {
        let login: LoginInput =
            serde_json::from_str(r#"{"email":"ada@example.com","password":"hunter22"}"#).unwrap();
        let profile: ProfileInput = serde_json::from_str(r#"{"password":"hunter22"}"#).unwrap();
        assert!(!format!("{login:?}").contains("hunter22"));
        assert!(!format!("{profile:?}").contains("hunter22"));
    }
}
