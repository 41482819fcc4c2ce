//! 仪表盘聚合

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::errors::Result;
use crate::services::users::{Identity, MeResponse, UserService};
use crate::storage::{LinkFilter, Partnership, PartnershipFilter, PartnershipStatus, SeaOrmStorage, ShortLink};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_links: usize,
    pub total_clicks: i64,
    pub active_partnerships: usize,
    pub pending_approvals: usize,
}

impl DashboardStats {
    /// 链接只算自己的；合作状态统计覆盖全部记录
    pub fn compute(links: &[ShortLink], partnerships: &[Partnership]) -> Self {
        Self {
            total_links: links.len(),
            total_clicks: links.iter().map(|l| l.click_count).sum(),
            active_partnerships: partnerships
                .iter()
                .filter(|p| p.status == PartnershipStatus::Active)
                .count(),
            pending_approvals: partnerships
                .iter()
                .filter(|p| p.status.is_awaiting_review())
                .count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub user: MeResponse,
    pub links: Vec<ShortLink>,
    /// 自己的 + active
    pub partnerships: Vec<Partnership>,
    pub stats: DashboardStats,
}

fn or_empty<T>(what: &str, loaded: Result<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|e| {
        warn!("Dashboard could not load {}: {}", what, e);
        Vec::new()
    })
}

pub struct DashboardService {
    storage: Arc<SeaOrmStorage>,
    users: Arc<UserService>,
}

impl DashboardService {
    pub fn new(storage: Arc<SeaOrmStorage>, users: Arc<UserService>) -> Self {
        Self { storage, users }
    }

    pub async fn load(&self, identity: &Identity) -> Result<DashboardData> {
        let user = self.users.me(identity).await?;
        // 两部分各自加载，失败的一半按空列表处理
        let links = or_empty(
            "links",
            self.storage
                .list_links(&LinkFilter::owned_by(&identity.email))
                .await,
        );
        let all = or_empty(
            "partnerships",
            self.storage
                .list_partnerships(&PartnershipFilter::default())
                .await,
        );

        let stats = DashboardStats::compute(&links, &all);
        let partnerships = all
            .into_iter()
            .filter(|p| {
                p.created_by.as_deref() == Some(identity.email.as_str())
                    || p.status == PartnershipStatus::Active
            })
            .collect();

        Ok(DashboardData {
            user,
            links,
            partnerships,
            stats,
        })
    }
}
