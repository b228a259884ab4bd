use sea_orm_migration::prelude::*;

use super::m20231014_090417_create_edit_table::Edit;

#[derive(DeriveMigrationName)]
pub struct Migration;

// SQLite takes a single change per ALTER TABLE, hence one statement per column.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Edit::Table)
                    .add_column(
                        ColumnDef::new(Edit::ContentType)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Edit::Table)
                    .add_column(ColumnDef::new(Edit::Etag).string_len(255).not_null().default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Edit::Table)
                    .drop_column(Edit::Etag)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Edit::Table)
                    .drop_column(Edit::ContentType)
                    .to_owned(),
            )
            .await
    }
}
