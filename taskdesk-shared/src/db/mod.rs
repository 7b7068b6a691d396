/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded sqlx migration runner
pub mod migrations;
pub mod pool;
