use sqlx::{migrate::MigrateDatabase, Pool, Sqlite, SqlitePool};

use crate::db::migration;

/// Store access point: opens the SQLite pool, enables WAL and bootstraps the
/// schema. Every repository function takes the returned pool by reference.
pub async fn establish_connection(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePool::connect(database_url).await?;

    // WAL mode for better concurrency between collector writes and reads
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

    migration::run_migrations(&pool).await?;

    Ok(pool)
}
