pub use sea_orm_migration::prelude::*;

mod m20231014_081522_create_resource_table;
mod m20231014_090417_create_edit_table;
mod m20231014_093310_indexes;
mod m20231016_120944_edit_response_meta;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20231014_081522_create_resource_table::Migration),
            Box::new(m20231014_090417_create_edit_table::Migration),
            Box::new(m20231014_093310_indexes::Migration),
            Box::new(m20231016_120944_edit_response_meta::Migration),
        ]
    }
}
