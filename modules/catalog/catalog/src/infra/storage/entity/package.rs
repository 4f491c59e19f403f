use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub summary: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub link: String,
    pub cover: String,
    pub version: String,
    pub last_updated_at: OffsetDateTime,
    pub view_count: i64,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::package_tag::Entity")]
    PackageTag,
}

impl Related<super::package_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackageTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
