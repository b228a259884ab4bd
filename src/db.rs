use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Connect to `url` and bring the schema up to date.
///
/// In-memory SQLite databases only live as long as their connection, so those
/// get a pool pinned to a single connection.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options.sqlx_logging(false);
    if url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    info!("Applying migrations");
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
