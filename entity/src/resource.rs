use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A tracked URL.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "resource")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub url: String,
    /// ETag from the last successful fetch, empty until one is seen
    pub conditional_token: String,
    pub last_polled_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::edit::Entity")]
    Edit,
}

impl Related<super::edit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Edit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
