use sqlx::SqlitePool;
use tracing::info;

use crate::db::INIT_SCHEMA;

/// Creates the three tables and their indexes if they do not exist yet.
/// Statements are idempotent, so running this on every startup is safe.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // SQLite executes one statement per call, so split the schema script.
    for statement in INIT_SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}
