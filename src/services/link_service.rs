//! 短链接创建、列表、删除与点击统计

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::get_config;
use crate::errors::{AuraError, Result};
use crate::services::shortener::{CreateShortLinkRequest, ShortenerService};
use crate::services::users::Identity;
use crate::storage::{
    ClickBreakdown, LinkFilter, LinkStatus, PartnershipStatus, SeaOrmStorage, ShortLink,
};
use crate::utils::{generate_random_code, is_valid_short_code, normalize_url, split_tags, validate_url};

pub const DEFAULT_TITLE: &str = "Affiliate Link";
pub const DEFAULT_CAMPAIGN: &str = "default";

/// 随机短码冲突时的最大尝试次数
const MAX_CODE_ATTEMPTS: usize = 5;

/// 点击统计里 top 列表的长度
pub const BREAKDOWN_LIMIT: u64 = 10;

/// 标签：数组或逗号分隔字符串
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            TagsInput::Csv(raw) => split_tags(&raw),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLinkRequest {
    pub destination_url: String,
    /// 自定义短码
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub partner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedLink {
    #[serde(flatten)]
    pub link: ShortLink,
    /// 可分享的跳转地址
    pub redirect_url: String,
}

/// `{public_base_url}/go/{code}`，有 campaign 时带上 `?campaign=`
pub fn redirect_url_for(link: &ShortLink) -> String {
    let config = get_config();
    let base = config.app.public_url(&format!("go/{}", link.code));
    match link.campaign.as_deref().filter(|c| !c.is_empty()) {
        Some(campaign) => format!("{}?campaign={}", base, urlencoding::encode(campaign)),
        None => base,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    shortener: Arc<ShortenerService>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, shortener: Arc<ShortenerService>) -> Self {
        Self { storage, shortener }
    }

    pub async fn create(&self, identity: &Identity, req: CreateLinkRequest) -> Result<CreatedLink> {
        let destination_url = normalize_url(&req.destination_url);
        validate_url(&destination_url).map_err(|e| AuraError::validation(e.to_string()))?;

        let custom_code = non_empty(req.code);
        if let Some(ref code) = custom_code
            && !is_valid_short_code(code)
        {
            return Err(AuraError::validation(format!(
                "Invalid short code '{}': use letters, digits, '_' or '-'",
                code
            )));
        }

        let (partner_id, partner_type) = match non_empty(req.partner_id) {
            Some(id) => {
                let partner = self
                    .storage
                    .get_partnership(&id)
                    .await?
                    .ok_or_else(|| AuraError::not_found(format!("Partnership not found: {}", id)))?;
                // 只有审核通过的 partner 才能关联
                if partner.status != PartnershipStatus::Active {
                    return Err(AuraError::validation(format!(
                        "Partnership {} is {}, only active partners can be linked",
                        id, partner.status
                    )));
                }
                (Some(partner.id.clone()), Some(partner.effective_type()))
            }
            None => (None, None),
        };

        let mut link = ShortLink {
            id: uuid::Uuid::new_v4().to_string(),
            code: String::new(),
            destination_url,
            title: non_empty(req.title).or_else(|| Some(DEFAULT_TITLE.to_string())),
            description: non_empty(req.description),
            campaign: non_empty(req.campaign).or_else(|| Some(DEFAULT_CAMPAIGN.to_string())),
            tags: req.tags.map(TagsInput::into_tags).unwrap_or_default(),
            status: LinkStatus::Active,
            click_count: 0,
            partner_id,
            partner_type,
            provider_link_id: None,
            provider_short_url: None,
            created_by: Some(identity.email.clone()),
            created_at: Utc::now(),
        };

        match custom_code {
            Some(code) => {
                link.code = code;
                self.storage.insert_link(&link).await?;
            }
            None => self.insert_with_random_code(&mut link).await?,
        }

        self.register_with_provider(identity, &mut link).await;

        let redirect_url = redirect_url_for(&link);
        Ok(CreatedLink { link, redirect_url })
    }

    async fn insert_with_random_code(&self, link: &mut ShortLink) -> Result<()> {
        let length = get_config().redirect.code_length.max(1);

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_random_code(length);
            if self.storage.code_exists(&code).await? {
                continue;
            }

            link.code = code;
            match self.storage.insert_link(link).await {
                Ok(()) => return Ok(()),
                // 检查与插入之间被抢占
                Err(AuraError::Conflict(msg)) => {
                    warn!("Random code collision on attempt {}: {}", attempt, msg);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AuraError::conflict(format!(
            "Could not allocate a unique short code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// 用户开启了集成且 provider 可用时注册外部短链；失败只记日志
    async fn register_with_provider(&self, identity: &Identity, link: &mut ShortLink) {
        if !self.shortener.is_available() {
            return;
        }

        let enabled = match self.storage.get_profile(&identity.email).await {
            Ok(Some(profile)) => profile.shortener_enabled,
            // 没有资料的用户按默认开启处理
            Ok(None) => true,
            Err(e) => {
                warn!("Failed to load profile for {}: {}", identity.email, e);
                false
            }
        };
        if !enabled {
            return;
        }

        let request = CreateShortLinkRequest {
            url: link.destination_url.clone(),
            key: None,
            title: link.title.clone(),
            description: link.description.clone(),
        };

        match self.shortener.create_short_link(request).await {
            Ok(provider_link) => {
                if let Err(e) = self
                    .storage
                    .set_link_provider(&link.id, &provider_link.link_id, &provider_link.short_url)
                    .await
                {
                    warn!("Failed to store provider link for {}: {}", link.code, e);
                    return;
                }
                info!("Link {} registered as {}", link.code, provider_link.short_url);
                link.provider_link_id = Some(provider_link.link_id);
                link.provider_short_url = Some(provider_link.short_url);
            }
            Err(e) => warn!("Shortener registration failed for {}: {}", link.code, e),
        }
    }

    pub async fn list_mine(&self, identity: &Identity) -> Result<Vec<ShortLink>> {
        self.storage
            .list_links(&LinkFilter::owned_by(&identity.email))
            .await
    }

    pub async fn list_all(&self, identity: &Identity) -> Result<Vec<ShortLink>> {
        identity.require_admin()?;
        self.storage.list_links(&LinkFilter::default()).await
    }

    /// 本人或管理员可访问
    async fn accessible_link(&self, identity: &Identity, id: &str) -> Result<ShortLink> {
        let link = self
            .storage
            .get_link(id)
            .await?
            .ok_or_else(|| AuraError::not_found(format!("Link not found: {}", id)))?;

        let owns = link.created_by.as_deref() == Some(identity.email.as_str());
        if !owns && !identity.is_admin {
            return Err(AuraError::forbidden("You can only manage your own links"));
        }
        Ok(link)
    }

    pub async fn delete(&self, identity: &Identity, id: &str) -> Result<()> {
        let link = self.accessible_link(identity, id).await?;
        self.storage.delete_link(&link.id).await
    }

    pub async fn click_breakdown(&self, identity: &Identity, id: &str) -> Result<ClickBreakdown> {
        let link = self.accessible_link(identity, id).await?;
        self.storage.click_breakdown(&link, BREAKDOWN_LIMIT).await
    }
}
