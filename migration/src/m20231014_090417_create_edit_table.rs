use sea_orm_migration::prelude::*;

use super::m20231014_081522_create_resource_table::Resource;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Edit::Table)
                    .col(
                        ColumnDef::new(Edit::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Edit::ResourceId).integer().not_null())
                    .col(ColumnDef::new(Edit::Patch).text().not_null())
                    .col(ColumnDef::new(Edit::Fingerprint).char_len(40).not_null())
                    .col(ColumnDef::new(Edit::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("edit-resource_id")
                            .from(Edit::Table, Edit::ResourceId)
                            .to(Resource::Table, Resource::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Edit::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Edit {
    Table,
    Id,
    ResourceId,
    Patch,
    Fingerprint,
    CreatedAt,
    ContentType,
    Etag,
}
