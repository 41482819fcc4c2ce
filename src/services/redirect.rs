//! Redirect resolver
//!
//! `/go/{code}` 和 `/r/{code}` 共用：查 short_links，记录点击，返回目标。
//! 点击记录失败只写日志，不影响跳转。

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, trace, warn};

use crate::errors::Result;
use crate::storage::{ClickEvent, ClickSink, SeaOrmStorage, ShortLink};
use crate::utils::is_valid_short_code;

/// 按短码查询链接
#[async_trait]
pub trait LinkLookup: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>>;
}

#[async_trait]
impl LinkLookup for SeaOrmStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        self.find_link_by_code(code).await
    }
}

/// 请求中与点击相关的原始信息
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub query: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClickContext {
    /// 流量来源：utm_source → ref:{domain} → direct
    pub fn source(&self) -> String {
        if let Some(ref query) = self.query
            && let Some(utm_source) = extract_query_param(query, "utm_source")
            && !utm_source.is_empty()
        {
            return utm_source.into_owned();
        }

        if let Some(ref referrer) = self.referrer
            && let Some(domain) = extract_domain(referrer)
        {
            return format!("ref:{}", domain);
        }

        "direct".to_string()
    }
}

/// 从 query string 提取参数值
fn extract_query_param<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
    for part in query.split('&') {
        if let Some(value) = part.strip_prefix(key).and_then(|s| s.strip_prefix('=')) {
            return urlencoding::decode(value).ok();
        }
    }
    None
}

/// 从 URL 提取域名
fn extract_domain(url: &str) -> Option<&str> {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    without_scheme
        .split(&['/', ':', '?', '#'][..])
        .next()
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// 路径里没有短码
    MissingCode,
    /// 短码格式非法
    InvalidCode,
    UnknownCode,
    Inactive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Redirect(ShortLink),
    NotFound(NotFoundReason),
    /// 查询失败
    Failed,
}

pub struct RedirectResolver {
    lookup: Arc<dyn LinkLookup>,
    sink: Arc<dyn ClickSink>,
}

impl RedirectResolver {
    pub fn new(lookup: Arc<dyn LinkLookup>, sink: Arc<dyn ClickSink>) -> Self {
        Self { lookup, sink }
    }

    pub fn from_storage(storage: Arc<SeaOrmStorage>) -> Self {
        let sink = storage.as_click_sink();
        Self::new(storage, sink)
    }

    pub async fn resolve(&self, code: Option<&str>, ctx: ClickContext) -> Resolution {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Resolution::NotFound(NotFoundReason::MissingCode);
        };

        if !is_valid_short_code(code) {
            trace!("Invalid short code rejected: {}", code);
            return Resolution::NotFound(NotFoundReason::InvalidCode);
        }

        let link = match self.lookup.find_by_code(code).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                debug!("Short code not found: {}", code);
                return Resolution::NotFound(NotFoundReason::UnknownCode);
            }
            Err(e) => {
                error!("Lookup failed for short code {}: {}", code, e);
                return Resolution::Failed;
            }
        };

        if !link.is_active() {
            debug!("Short code {} is {}", code, link.status);
            return Resolution::NotFound(NotFoundReason::Inactive);
        }

        let event = ClickEvent {
            link_id: link.id.clone(),
            code: link.code.clone(),
            source: Some(ctx.source()),
            referrer: ctx.referrer,
            user_agent: ctx.user_agent,
            ip_address: ctx.ip_address,
        };
        if let Err(e) = self.sink.record_click(event).await {
            warn!("Failed to record click for {}: {}", link.code, e);
        }

        Resolution::Redirect(link)
    }
}
