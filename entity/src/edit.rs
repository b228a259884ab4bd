use sea_orm::entity::prelude::*;

/// One link in a resource's edit chain.
///
/// `patch` turns the content reconstructed from every earlier edit of the same
/// resource into the content fingerprinted by `fingerprint`. `content_type`
/// and `etag` are what the server sent with that content, empty when absent.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "edit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub resource_id: i32,
    #[sea_orm(column_type = "Text")]
    pub patch: String,
    pub fingerprint: String,
    pub created_at: DateTimeUtc,
    pub content_type: String,
    pub etag: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
