//! SeaORM storage backend
//!
//! SQLite, MySQL/MariaDB 和 PostgreSQL，类型由数据库 URL 推断。
//! 读路径走 `retry::with_retry`，写路径不重试。

mod clicks;
mod connection;
mod converters;
mod links;
mod partnerships;
pub mod retry;
mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::errors::{AuraError, Result};
use crate::storage::models::{ClickEvent, StorageConfig};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    model_to_partnership, model_to_profile, model_to_shortlink, partnership_to_active_model,
    profile_to_active_model, shortlink_to_active_model,
};
pub use links::LinkFilter;
pub use partnerships::PartnershipFilter;
pub use users::ProfilePatch;

/// 点击记录落库
///
/// 原子自增 click_count 并追加一条 click_logs 记录。
#[async_trait]
pub trait ClickSink: Send + Sync {
    async fn record_click(&self, event: ClickEvent) -> Result<()>;
}

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(AuraError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 裸文件路径补成 sqlite URL
fn sqlite_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else if database_url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{}?mode=rwc", database_url)
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(AuraError::database_config("database_url is not set"));
        }

        let config = crate::config::get_config();
        let retry_config = retry::RetryConfig::from(&config.database);

        let db = if backend_name == "sqlite" {
            connect_sqlite(&sqlite_url(database_url)).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = Self::from_connection(db, backend_name, retry_config);

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 用已有连接构造（不跑迁移）
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        retry_config: retry::RetryConfig,
    ) -> Self {
        Self {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        }
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
            support_click: true,
        }
    }

    pub fn as_click_sink(&self) -> Arc<dyn ClickSink> {
        Arc::new(self.clone())
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 存活检查
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| AuraError::database_connection(e.to_string()))
    }
}
