use sea_orm_migration::prelude::*;

use super::m20231014_081522_create_resource_table::Resource;
use super::m20231014_090417_create_edit_table::Edit;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_index(Index::create()
            .name("resource-url")
            .table(Resource::Table)
            .col(Resource::Url)
            .unique()
            .to_owned()
        ).await?;

        manager.create_index(Index::create()
            .name("resource-last_polled_at")
            .table(Resource::Table)
            .col(Resource::LastPolledAt)
            .to_owned()
        ).await?;

        manager.create_index(Index::create()
            .name("edit-resource_id-id")
            .table(Edit::Table)
            .col(Edit::ResourceId)
            .col(Edit::Id)
            .unique()
            .to_owned()
        ).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop()
            .name("edit-resource_id-id")
            .table(Edit::Table)
            .to_owned()
        ).await?;

        manager.drop_index(Index::drop()
            .name("resource-last_polled_at")
            .table(Resource::Table)
            .to_owned()
        ).await?;

        manager.drop_index(Index::drop()
            .name("resource-url")
            .table(Resource::Table)
            .to_owned()
        ).await
    }
}
