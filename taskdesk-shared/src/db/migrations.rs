/// Database migration runner
///
/// Migrations live in `taskdesk-shared/migrations/` and are applied with
/// sqlx's embedded migrator at startup. The schema is three tables: users,
/// projects, and tasks, with the project→task and user→task foreign keys
/// declared `ON DELETE CASCADE` so referential integrity is the storage
/// layer's job, not the application's.
use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
