use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{AuraError, Result};
use migration::{Migrator, MigratorTrait};

/// 连接 SQLite 数据库（自动创建文件，WAL 模式）
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
    use std::str::FromStr;

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AuraError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .pragma("temp_store", "memory");

    let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
        AuraError::database_connection(format!("Failed to connect to SQLite: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL / PostgreSQL
pub async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
    let config = crate::config::get_config();
    let pool_size = config.database.pool_size;
    let timeout = std::time::Duration::from_secs(config.database.timeout);

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(5))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(std::time::Duration::from_secs(300))
        .max_lifetime(std::time::Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        AuraError::database_connection(format!(
            "Failed to connect to {} database: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| AuraError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
