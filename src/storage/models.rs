use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::metadata::BusinessInfo;

/// 短链接状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkStatus {
    #[default]
    Active,
    Inactive,
}

/// 合作状态
///
/// `Expired` 只用于展示，任何状态迁移都不会产生它。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartnershipStatus {
    Pending,
    PendingReview,
    Active,
    Rejected,
    Expired,
}

impl PartnershipStatus {
    /// 等待审核（pending 或 pending_review）
    pub fn is_awaiting_review(self) -> bool {
        matches!(self, Self::Pending | Self::PendingReview)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartnerType {
    #[default]
    Affiliate,
    Business,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: String,
    pub code: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub campaign: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: LinkStatus,
    #[serde(default)]
    pub click_count: i64,
    pub partner_id: Option<String>,
    pub partner_type: Option<PartnerType>,
    pub provider_link_id: Option<String>,
    pub provider_short_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    pub fn is_active(&self) -> bool {
        self.status == LinkStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    pub id: String,
    pub website: String,
    pub contact_email: String,
    pub partner_type: Option<PartnerType>,
    pub status: PartnershipStatus,
    pub notes: Option<String>,
    pub commission_rate: Option<f64>,
    /// 结构化的商家字段（business_name, contact_name ...）
    #[serde(flatten)]
    pub info: BusinessInfo,
    pub last_contact_date: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partnership {
    /// 缺失 partner_type 的记录按 affiliate 处理
    pub fn effective_type(&self) -> PartnerType {
        self.partner_type.unwrap_or_default()
    }

    /// 商家字段：优先结构化列，全部为空时回退到解析 notes
    pub fn business_info(&self) -> BusinessInfo {
        if !self.info.is_empty() {
            return self.info.clone();
        }
        BusinessInfo::from_notes(self.notes.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: Option<String>,
    pub notify_new_partnership: bool,
    pub shortener_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 一次点击（写入 click_logs）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: String,
    pub code: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub name: String,
    pub count: i64,
}

/// 单个链接的点击分布
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickBreakdown {
    pub link_id: String,
    pub code: String,
    pub total_clicks: i64,
    pub logged_clicks: i64,
    pub top_referrers: Vec<CountEntry>,
    pub top_sources: Vec<CountEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
    pub support_click: bool,
}
