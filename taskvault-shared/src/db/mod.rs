/// Database layer for TaskVault
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with a health check
/// - `migrations`: Embedded sqlx migration runner

pub mod migrations;
pub mod pool;
