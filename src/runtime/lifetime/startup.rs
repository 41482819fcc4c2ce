use crate::config::get_config;
use crate::services::AppServices;
use crate::storage::{SeaOrmStorage, StorageFactory};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub services: AppServices,
}

/// 准备服务器启动的上下文
/// 包括存储、迁移和各业务服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // 多个依赖各自带 rustls，显式指定 provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let config = get_config();
    let services = AppServices::from_config(storage.clone(), &config);

    if services.shortener.is_available() {
        info!("Link shortener provider enabled ({})", config.shortener.domain);
    } else {
        debug!("Link shortener provider disabled");
    }
    if config.auth.admin_email.trim().is_empty() {
        warn!("auth.admin_email is empty, admin endpoints will reject everyone");
    }

    info!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );

    Ok(StartupContext { storage, services })
}
