//! 商家目录

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{AuraError, Result};
use crate::metadata::BusinessInfo;
use crate::services::users::Identity;
use crate::storage::{
    LinkFilter, PartnerType, Partnership, PartnershipFilter, PartnershipStatus, SeaOrmStorage,
    ShortLink,
};
use crate::utils::url_host;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// `all` 或空表示不过滤
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub partnership: Partnership,
    pub info: BusinessInfo,
    pub link_count: usize,
    pub total_clicks: i64,
    /// contact_email 是当前用户
    pub is_owner: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    pub businesses: Vec<DirectoryEntry>,
    pub categories: Vec<String>,
}

/// partner_id 匹配，或目标地址包含商家域名
pub fn link_belongs_to(link: &ShortLink, business: &Partnership) -> bool {
    if link.partner_id.as_deref() == Some(business.id.as_str()) {
        return true;
    }
    match url_host(&business.website) {
        Some(host) => link.destination_url.to_lowercase().contains(&host),
        None => false,
    }
}

fn matches(entry: &Partnership, info: &BusinessInfo, query: &DirectoryQuery) -> bool {
    let search_ok = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            [
                entry.notes.as_deref(),
                Some(entry.website.as_str()),
                info.business.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
        }
        _ => true,
    };

    let category_ok = match query.category.as_deref().map(str::trim) {
        Some(cat) if !cat.is_empty() && !cat.eq_ignore_ascii_case("all") => {
            info.category.as_deref() == Some(cat)
        }
        _ => true,
    };

    search_ok && category_ok
}

pub struct DirectoryService {
    storage: Arc<SeaOrmStorage>,
}

impl DirectoryService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 管理员或至少创建过一个 partnership 的用户才能浏览；非管理员只看 active
    pub async fn list(&self, identity: &Identity, query: &DirectoryQuery) -> Result<Directory> {
        if !identity.is_admin {
            let own = self
                .storage
                .list_partnerships(&PartnershipFilter {
                    created_by: Some(identity.email.clone()),
                    ..Default::default()
                })
                .await?;
            if own.is_empty() {
                return Err(AuraError::forbidden(
                    "Directory access requires at least one partnership",
                ));
            }
        }

        let statuses = if identity.is_admin {
            Vec::new()
        } else {
            vec![PartnershipStatus::Active]
        };
        let businesses = self
            .storage
            .list_partnerships(&PartnershipFilter {
                partner_type: Some(PartnerType::Business),
                statuses,
                ..Default::default()
            })
            .await?;

        let categories: BTreeSet<String> = businesses
            .iter()
            .filter_map(|b| b.business_info().category)
            .filter(|c| !c.trim().is_empty())
            .collect();

        let links = self.storage.list_links(&LinkFilter::default()).await?;

        let entries = businesses
            .into_iter()
            .filter_map(|p| {
                let info = p.business_info();
                if !matches(&p, &info, query) {
                    return None;
                }
                let linked: Vec<&ShortLink> =
                    links.iter().filter(|l| link_belongs_to(l, &p)).collect();
                let is_owner = p.contact_email.eq_ignore_ascii_case(&identity.email);
                Some(DirectoryEntry {
                    link_count: linked.len(),
                    total_clicks: linked.iter().map(|l| l.click_count).sum(),
                    is_owner,
                    info,
                    partnership: p,
                })
            })
            .collect();

        Ok(Directory {
            businesses: entries,
            categories: categories.into_iter().collect(),
        })
    }
}
