use std::str::FromStr;

use tracing::warn;

use crate::metadata::BusinessInfo;
use crate::storage::models::{
    LinkStatus, PartnerType, Partnership, PartnershipStatus, ShortLink, UserProfile,
};
use migration::entities::{partnership, short_link, user_profile};

/// tags 列存 JSON 数组文本；解析失败当作空
fn parse_tags(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Invalid tags JSON '{}': {}", raw, e);
        Vec::new()
    })
}

fn tags_to_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn parse_partner_type(raw: Option<String>) -> Option<PartnerType> {
    let raw = raw?;
    match PartnerType::from_str(&raw) {
        Ok(t) => Some(t),
        Err(_) => {
            warn!("Unknown partner_type '{}', treating as missing", raw);
            None
        }
    }
}

fn parse_partnership_status(raw: &str) -> PartnershipStatus {
    PartnershipStatus::from_str(raw).unwrap_or_else(|_| {
        warn!("Unknown partnership status '{}', treating as pending", raw);
        PartnershipStatus::Pending
    })
}

/// 将 short_links Model 转换为 ShortLink
pub fn model_to_shortlink(model: short_link::Model) -> ShortLink {
    ShortLink {
        status: LinkStatus::from_str(&model.status).unwrap_or(LinkStatus::Inactive),
        tags: parse_tags(&model.tags),
        click_count: model.click_count.max(0),
        partner_type: parse_partner_type(model.partner_type),
        id: model.id,
        code: model.code,
        destination_url: model.destination_url,
        title: model.title,
        description: model.description,
        campaign: model.campaign,
        partner_id: model.partner_id,
        provider_link_id: model.provider_link_id,
        provider_short_url: model.provider_short_url,
        created_by: model.created_by,
        created_at: model.created_at,
    }
}

/// 将 ShortLink 转换为 ActiveModel
///
/// 更新时不写 click_count 和 created_at：计数只走原子自增。
pub fn shortlink_to_active_model(link: &ShortLink, is_new: bool) -> short_link::ActiveModel {
    use sea_orm::ActiveValue::*;

    short_link::ActiveModel {
        id: Set(link.id.clone()),
        code: Set(link.code.clone()),
        destination_url: Set(link.destination_url.clone()),
        title: Set(link.title.clone()),
        description: Set(link.description.clone()),
        campaign: Set(link.campaign.clone()),
        tags: Set(tags_to_json(&link.tags)),
        status: Set(link.status.to_string()),
        click_count: if is_new {
            Set(link.click_count.max(0))
        } else {
            NotSet
        },
        partner_id: Set(link.partner_id.clone()),
        partner_type: Set(link.partner_type.map(|t| t.to_string())),
        provider_link_id: Set(link.provider_link_id.clone()),
        provider_short_url: Set(link.provider_short_url.clone()),
        created_by: Set(link.created_by.clone()),
        created_at: if is_new { Set(link.created_at) } else { NotSet },
    }
}

pub fn model_to_partnership(model: partnership::Model) -> Partnership {
    Partnership {
        status: parse_partnership_status(&model.status),
        partner_type: parse_partner_type(model.partner_type),
        info: BusinessInfo {
            business: model.business_name,
            contact: model.contact_name,
            product: model.product,
            commission_offer: model.commission_offer,
            additional_info: model.additional_info,
            category: model.category,
        },
        id: model.id,
        website: model.website,
        contact_email: model.contact_email,
        notes: model.notes,
        commission_rate: model.commission_rate,
        last_contact_date: model.last_contact_date,
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn partnership_to_active_model(p: &Partnership, is_new: bool) -> partnership::ActiveModel {
    use sea_orm::ActiveValue::*;

    partnership::ActiveModel {
        id: Set(p.id.clone()),
        website: Set(p.website.clone()),
        contact_email: Set(p.contact_email.clone()),
        partner_type: Set(p.partner_type.map(|t| t.to_string())),
        status: Set(p.status.to_string()),
        notes: Set(p.notes.clone()),
        commission_rate: Set(p.commission_rate),
        business_name: Set(p.info.business.clone()),
        contact_name: Set(p.info.contact.clone()),
        product: Set(p.info.product.clone()),
        commission_offer: Set(p.info.commission_offer.clone()),
        additional_info: Set(p.info.additional_info.clone()),
        category: Set(p.info.category.clone()),
        last_contact_date: Set(p.last_contact_date),
        created_by: if is_new {
            Set(p.created_by.clone())
        } else {
            NotSet
        },
        created_at: if is_new { Set(p.created_at) } else { NotSet },
        updated_at: Set(p.updated_at),
    }
}

pub fn model_to_profile(model: user_profile::Model) -> UserProfile {
    UserProfile {
        email: model.email,
        full_name: model.full_name,
        notify_new_partnership: model.notify_new_partnership,
        shortener_enabled: model.shortener_enabled,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn profile_to_active_model(profile: &UserProfile, is_new: bool) -> user_profile::ActiveModel {
    use sea_orm::ActiveValue::*;

    user_profile::ActiveModel {
        email: Set(profile.email.clone()),
        full_name: Set(profile.full_name.clone()),
        notify_new_partnership: Set(profile.notify_new_partnership),
        shortener_enabled: Set(profile.shortener_enabled),
        created_at: if is_new {
            Set(profile.created_at)
        } else {
            NotSet
        },
        updated_at: Set(profile.updated_at),
    }
}
