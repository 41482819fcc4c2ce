//! 外部短链服务
//!
//! `ShortenerProvider` 抽象创建短链和查询统计两个操作；`ShortenerService`
//! 负责 key 生成和统计缓存。

mod dub;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ShortenerConfig;
use crate::errors::{AuraError, Result};
use crate::utils::generate_random_code;

pub use dub::DubProvider;

/// 未指定 key 时生成的长度
pub const GENERATED_KEY_LEN: usize = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateShortLinkRequest {
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
    pub short_url: String,
    pub link_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub total_clicks: u64,
    #[serde(default)]
    pub locations: Vec<serde_json::Value>,
    #[serde(default)]
    pub devices: Vec<serde_json::Value>,
    #[serde(default)]
    pub browsers: Vec<serde_json::Value>,
    #[serde(default)]
    pub referrers: Vec<serde_json::Value>,
}

#[async_trait]
pub trait ShortenerProvider: Send + Sync {
    /// `request.key` 已由调用方补齐
    async fn create_short_link(&self, request: &CreateShortLinkRequest) -> Result<ProviderLink>;

    async fn get_stats(&self, link_id: &str) -> Result<ProviderStats>;

    fn name(&self) -> &'static str;
}

pub struct ShortenerService {
    provider: Option<Arc<dyn ShortenerProvider>>,
    stats_cache: Cache<String, ProviderStats>,
}

impl ShortenerService {
    pub fn new(provider: Option<Arc<dyn ShortenerProvider>>, stats_cache_secs: u64) -> Self {
        Self {
            provider,
            stats_cache: Cache::builder()
                .time_to_live(Duration::from_secs(stats_cache_secs.max(1)))
                .max_capacity(1_000)
                .build(),
        }
    }

    /// 按配置构造；未启用或缺少 API key 时 provider 为空
    pub fn from_config(config: &ShortenerConfig) -> Self {
        let provider: Option<Arc<dyn ShortenerProvider>> =
            if config.enabled && !config.api_key.trim().is_empty() {
                Some(Arc::new(DubProvider::new(config)))
            } else {
                if config.enabled {
                    tracing::warn!("Shortener enabled but api_key is empty, provider disabled");
                }
                None
            };
        Self::new(provider, config.stats_cache_secs)
    }

    pub fn disabled() -> Self {
        Self::new(None, 1)
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn ShortenerProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| AuraError::external_service("Link shortener is not configured"))
    }

    pub async fn create_short_link(
        &self,
        mut request: CreateShortLinkRequest,
    ) -> Result<ProviderLink> {
        let provider = self.provider()?;

        if request.url.trim().is_empty() {
            return Err(AuraError::validation("url is required"));
        }
        if request.key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            request.key = Some(generate_random_code(GENERATED_KEY_LEN).to_lowercase());
        }

        provider.create_short_link(&request).await
    }

    /// 统计结果缓存 `stats_cache_secs`；失败不缓存
    pub async fn get_stats(&self, link_id: &str) -> Result<ProviderStats> {
        let provider = self.provider()?.clone();
        if link_id.trim().is_empty() {
            return Err(AuraError::validation("link_id is required"));
        }

        let key = link_id.to_string();
        self.stats_cache
            .try_get_with(key, async move {
                debug!("Shortener stats cache miss for {}", link_id);
                provider.get_stats(link_id).await
            })
            .await
            .map_err(|e: Arc<AuraError>| (*e).clone())
    }
}
