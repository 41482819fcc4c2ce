//! Dub.co 风格的 HTTP 实现
//!
//! ureq 是同步客户端，请求放在 spawn_blocking 里执行。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, warn};
use ureq::Agent;

use super::{CreateShortLinkRequest, ProviderLink, ProviderStats, ShortenerProvider};
use crate::config::ShortenerConfig;
use crate::errors::{AuraError, Result};

const DEFAULT_TITLE: &str = "Affiliate Link";

pub struct DubProvider {
    agent: Agent,
    api_base_url: String,
    api_key: String,
    domain: String,
}

impl DubProvider {
    pub fn new(config: &ShortenerConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            domain: config.domain.clone(),
        }
    }

    /// 失败响应里的错误消息（`{"error": "..."}` 或 `{"error": {"message": "..."}}`）
    fn error_message(body: &Value, status: u16) -> String {
        body["error"]["message"]
            .as_str()
            .or_else(|| body["error"].as_str())
            .map(String::from)
            .unwrap_or_else(|| format!("provider returned HTTP {}", status))
    }

    fn create_sync(
        agent: Agent,
        url: String,
        auth: String,
        payload: Value,
    ) -> std::result::Result<Value, String> {
        let mut resp = agent
            .post(&url)
            .header("Accept", "application/json")
            .header("Authorization", &auth)
            .send_json(&payload)
            .map_err(|e| e.to_string())?;

        let status = resp.status().as_u16();
        let body: Value = resp.body_mut().read_json().unwrap_or(Value::Null);
        if !(200..300).contains(&status) {
            return Err(Self::error_message(&body, status));
        }
        Ok(body)
    }

    fn stats_sync(agent: Agent, url: String, auth: String) -> std::result::Result<Value, String> {
        let mut resp = agent
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", &auth)
            .call()
            .map_err(|e| e.to_string())?;

        let status = resp.status().as_u16();
        let body: Value = resp.body_mut().read_json().unwrap_or(Value::Null);
        if !(200..300).contains(&status) {
            return Err(Self::error_message(&body, status));
        }
        Ok(body)
    }

    fn parse_stats(body: &Value) -> ProviderStats {
        let list = |key: &str| body[key].as_array().cloned().unwrap_or_default();
        ProviderStats {
            total_clicks: body["totalClicks"]
                .as_u64()
                .or_else(|| body["clicks"].as_u64())
                .unwrap_or(0),
            locations: list("locations"),
            devices: list("devices"),
            browsers: list("browsers"),
            referrers: list("referrers"),
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, String> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(msg)) => Err(AuraError::external_service(msg)),
        Err(e) => {
            warn!("Shortener spawn_blocking failed: {}", e);
            Err(AuraError::external_service(format!("Shortener task failed: {}", e)))
        }
    }
}

#[async_trait]
impl ShortenerProvider for DubProvider {
    async fn create_short_link(&self, request: &CreateShortLinkRequest) -> Result<ProviderLink> {
        let key = request
            .key
            .clone()
            .ok_or_else(|| AuraError::validation("Shortener key is required"))?;

        let payload = json!({
            "url": request.url,
            "domain": self.domain,
            "key": key,
            "title": request.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TITLE),
            "description": request.description.clone().unwrap_or_default(),
            "archived": false,
        });

        let url = format!("{}/links", self.api_base_url);
        let auth = format!("Bearer {}", self.api_key);
        let agent = self.agent.clone();
        let body = run_blocking(move || Self::create_sync(agent, url, auth, payload)).await?;

        let link = ProviderLink {
            short_url: body["shortLink"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("https://{}/{}", self.domain, key)),
            link_id: key,
        };
        info!("Short link registered with provider: {}", link.short_url);
        Ok(link)
    }

    async fn get_stats(&self, link_id: &str) -> Result<ProviderStats> {
        let url = format!(
            "{}/links/{}/{}/stats",
            self.api_base_url,
            urlencoding::encode(&self.domain),
            urlencoding::encode(link_id)
        );
        let auth = format!("Bearer {}", self.api_key);
        let agent = self.agent.clone();
        let body = run_blocking(move || Self::stats_sync(agent, url, auth)).await?;
        Ok(Self::parse_stats(&body))
    }

    fn name(&self) -> &'static str {
        "dub"
    }
}
