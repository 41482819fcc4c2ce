//! 合作申请与审核流程
//!
//! 状态机：
//! - approve:    pending | pending_review → active
//! - reject:     pending | pending_review → rejected
//! - deactivate: active → rejected
//! - reactivate: rejected → active
//!
//! 每次迁移成功后发一封通知邮件；邮件失败不回滚状态。

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::config::get_config;
use crate::errors::{AuraError, Result};
use crate::metadata::BusinessInfo;
use crate::services::email::{EmailMessage, EmailSender, send_logged};
use crate::services::notifications;
use crate::services::users::Identity;
use crate::storage::{PartnerType, Partnership, PartnershipFilter, PartnershipStatus, SeaOrmStorage};
use crate::utils::{normalize_url, validate_url};

/// 管理员操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdminAction {
    Approve,
    Reject,
    Deactivate,
    Reactivate,
}

impl AdminAction {
    /// 计算目标状态；不允许的迁移返回 InvalidTransition
    pub fn apply(self, from: PartnershipStatus) -> Result<PartnershipStatus> {
        use PartnershipStatus::*;

        let to = match (self, from) {
            (AdminAction::Approve, Pending | PendingReview) => Active,
            (AdminAction::Reject, Pending | PendingReview) => Rejected,
            (AdminAction::Deactivate, Active) => Rejected,
            (AdminAction::Reactivate, Rejected) => Active,
            _ => {
                return Err(AuraError::invalid_transition(format!(
                    "Cannot {} a partnership that is {}",
                    self, from
                )));
            }
        };
        Ok(to)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffiliateRequest {
    pub website: String,
    pub contact_email: String,
    #[serde(default)]
    pub commission_rate: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessRequest {
    pub business_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub website: String,
    pub product_description: String,
    pub commission_offer: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// 同一状态下按类型分开
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypedGroup {
    pub affiliates: Vec<Partnership>,
    pub businesses: Vec<Partnership>,
}

impl TypedGroup {
    fn push(&mut self, p: Partnership) {
        match p.effective_type() {
            PartnerType::Affiliate => self.affiliates.push(p),
            PartnerType::Business => self.businesses.push(p),
        }
    }

    pub fn len(&self) -> usize {
        self.affiliates.len() + self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 管理面板
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminOverview {
    pub pending: TypedGroup,
    pub active: TypedGroup,
    pub rejected: TypedGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuraError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn validate_email(value: &str) -> Result<String> {
    let email = required(value, "contact_email")?;
    if !email.contains('@') {
        return Err(AuraError::validation(format!("Invalid email address: {}", email)));
    }
    Ok(email)
}

fn validate_website(value: &str) -> Result<String> {
    let website = normalize_url(&required(value, "website")?);
    validate_url(&website).map_err(|e| AuraError::validation(e.to_string()))?;
    Ok(website)
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 大小写不敏感搜索：website、contact_email、notes、Business、Contact
pub fn matches_search(p: &Partnership, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    let info = p.business_info();
    [
        Some(p.website.as_str()),
        Some(p.contact_email.as_str()),
        p.notes.as_deref(),
        info.business.as_deref(),
        info.contact.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

pub struct PartnershipService {
    storage: Arc<SeaOrmStorage>,
    email: Arc<dyn EmailSender>,
}

impl PartnershipService {
    pub fn new(storage: Arc<SeaOrmStorage>, email: Arc<dyn EmailSender>) -> Self {
        Self { storage, email }
    }

    /// 已登录用户发起 affiliate 合作
    pub async fn request_affiliate(
        &self,
        identity: &Identity,
        req: AffiliateRequest,
    ) -> Result<Partnership> {
        let website = validate_website(&req.website)?;
        let contact_email = validate_email(&req.contact_email)?;
        if let Some(rate) = req.commission_rate
            && !(0.0..=100.0).contains(&rate)
        {
            return Err(AuraError::validation("commission_rate must be between 0 and 100"));
        }

        let now = Utc::now();
        let partnership = Partnership {
            id: uuid::Uuid::new_v4().to_string(),
            website,
            contact_email,
            partner_type: Some(PartnerType::Affiliate),
            status: PartnershipStatus::Pending,
            notes: optional(req.notes),
            commission_rate: req.commission_rate,
            info: BusinessInfo::default(),
            last_contact_date: Some(now.date_naive()),
            created_by: Some(identity.email.clone()),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_partnership(&partnership).await?;

        let config = get_config();
        let outreach =
            notifications::affiliate_outreach(&config.app, &partnership, identity.display_name());
        send_logged(self.email.as_ref(), &outreach).await;

        let notify = match self.storage.get_profile(&identity.email).await {
            Ok(profile) => profile.is_none_or(|p| p.notify_new_partnership),
            Err(e) => {
                warn!("Failed to load profile for {}: {}", identity.email, e);
                true
            }
        };
        if notify {
            let confirmation = notifications::affiliate_request_confirmation(
                &config.app,
                &partnership,
                &identity.email,
            );
            send_logged(self.email.as_ref(), &confirmation).await;
        }

        Ok(partnership)
    }

    /// 公开的商家合作申请
    pub async fn request_business(
        &self,
        identity: Option<&Identity>,
        req: BusinessRequest,
    ) -> Result<Partnership> {
        let info = BusinessInfo {
            business: Some(required(&req.business_name, "business_name")?),
            contact: Some(required(&req.contact_name, "contact_name")?),
            product: Some(required(&req.product_description, "product_description")?),
            commission_offer: Some(required(&req.commission_offer, "commission_offer")?),
            additional_info: optional(req.additional_info),
            category: optional(req.category),
        };
        let contact_email = validate_email(&req.contact_email)?;
        let website = validate_website(&req.website)?;

        let now = Utc::now();
        let partnership = Partnership {
            id: uuid::Uuid::new_v4().to_string(),
            website,
            contact_email,
            partner_type: Some(PartnerType::Business),
            status: PartnershipStatus::PendingReview,
            notes: Some(info.to_notes()),
            commission_rate: None,
            info,
            last_contact_date: None,
            created_by: identity.map(|i| i.email.clone()),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_partnership(&partnership).await?;

        let config = get_config();
        let admin_notice = notifications::business_request_admin(&config.app, &partnership);
        send_logged(self.email.as_ref(), &admin_notice).await;
        let confirmation = notifications::business_request_confirmation(&config.app, &partnership);
        send_logged(self.email.as_ref(), &confirmation).await;

        Ok(partnership)
    }

    /// 自己提交的 + 所有 active 的
    pub async fn visible_for(&self, identity: &Identity) -> Result<Vec<Partnership>> {
        self.storage
            .list_partnerships(&PartnershipFilter {
                created_by: Some(identity.email.clone()),
                include_all_active: true,
                ..Default::default()
            })
            .await
    }

    /// 管理员执行状态迁移，随后发一封通知
    pub async fn apply_action(
        &self,
        identity: &Identity,
        id: &str,
        action: AdminAction,
    ) -> Result<Partnership> {
        identity.require_admin()?;

        let current = self
            .storage
            .get_partnership(id)
            .await?
            .ok_or_else(|| AuraError::not_found(format!("Partnership not found: {}", id)))?;
        let next = action.apply(current.status)?;

        let updated = self
            .storage
            .update_partnership_status(id, next, Utc::now())
            .await?;
        info!(
            "Admin {} {} partnership {} ({} -> {})",
            identity.email, action, id, current.status, next
        );

        let config = get_config();
        let message = notifications::status_change(&config.app, &updated);
        send_logged(self.email.as_ref(), &message).await;

        Ok(updated)
    }

    pub async fn admin_overview(
        &self,
        identity: &Identity,
        search: Option<&str>,
    ) -> Result<AdminOverview> {
        identity.require_admin()?;

        let all = self
            .storage
            .list_partnerships(&PartnershipFilter::default())
            .await?;

        let mut overview = AdminOverview::default();
        for p in all
            .into_iter()
            .filter(|p| search.is_none_or(|term| matches_search(p, term)))
        {
            match p.status {
                s if s.is_awaiting_review() => overview.pending.push(p),
                PartnershipStatus::Active => overview.active.push(p),
                PartnershipStatus::Rejected => overview.rejected.push(p),
                _ => {}
            }
        }
        Ok(overview)
    }

    /// 管理员手动发信，失败直接返回
    pub async fn send_admin_email(&self, identity: &Identity, req: AdminEmailRequest) -> Result<()> {
        identity.require_admin()?;

        let to = validate_email(&req.to)?;
        let subject = required(&req.subject, "subject")?;
        let body = required(&req.body, "body")?;

        self.email
            .send(&EmailMessage::new(to, subject, body))
            .await
            .map_err(|e| match e {
                AuraError::EmailDelivery(_) => e,
                other => AuraError::email_delivery(other.to_string()),
            })
    }
}
