//! 通知邮件模板

use crate::config::AppConfig;
use crate::metadata::BusinessInfo;
use crate::services::email::EmailMessage;
use crate::storage::{Partnership, PartnershipStatus};

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("N/A")
}

/// 状态变更通知，发给 contact_email
pub fn status_change(app: &AppConfig, partnership: &Partnership) -> EmailMessage {
    let status = partnership.status;
    let headline = match status {
        PartnershipStatus::Active => {
            "We're happy to inform you that your partnership application has been approved!"
                .to_string()
        }
        PartnershipStatus::Rejected => "After careful review, we regret to inform you that we're unable to approve your partnership application at this time.".to_string(),
        other => format!(
            "The status of your partnership application has been updated to: {}",
            other
        ),
    };

    let subject = format!(
        "Your {} Partnership Application: {}",
        app.brand_name,
        status.as_ref().to_uppercase()
    );

    let body = format!(
        "Hello,\n\n{}\n\nWebsite: {}\n\nIf you have any questions, please reply to this email.\n\nBest regards,\n{}",
        headline, partnership.website, app.team_signature
    );

    EmailMessage::new(&partnership.contact_email, subject, body)
}

/// 发给被邀请合作方的邀请邮件
pub fn affiliate_outreach(
    app: &AppConfig,
    partnership: &Partnership,
    requester_name: &str,
) -> EmailMessage {
    let commission = partnership
        .commission_rate
        .map(|rate| format!("\nProposed commission: {}%", rate))
        .unwrap_or_default();
    let notes = partnership
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!("\n\nAdditional notes:\n{}", n))
        .unwrap_or_default();

    let body = format!(
        "Hello,\n\n{} would like to partner with {} through {}.\n\nWebsite: {}{}{}\n\nWe'll be in touch with next steps shortly.\n\nBest regards,\n{}",
        requester_name,
        partnership.website,
        app.brand_domain,
        partnership.website,
        commission,
        notes,
        app.team_signature
    );

    EmailMessage::new(
        &partnership.contact_email,
        format!("New Partnership Opportunity from {}", app.brand_domain),
        body,
    )
}

/// 发给发起人的确认邮件
pub fn affiliate_request_confirmation(
    app: &AppConfig,
    partnership: &Partnership,
    requester_email: &str,
) -> EmailMessage {
    let body = format!(
        "Hello,\n\nYour partnership request for {} has been submitted and is pending review.\nContact: {}\n\nBest regards,\n{}",
        partnership.website, partnership.contact_email, app.team_signature
    );

    EmailMessage::new(
        requester_email,
        format!("Your Partnership Request with {}", app.brand_name),
        body,
    )
}

/// 新商家请求通知管理员
pub fn business_request_admin(app: &AppConfig, partnership: &Partnership) -> EmailMessage {
    let info = partnership.business_info();
    let body = format!(
        "A new business partnership request has been submitted.\n\nBusiness: {}\nContact: {}\nEmail: {}\nWebsite: {}\nCategory: {}\nProduct: {}\nCommission offer: {}\nAdditional info: {}\n\nReview it in the admin panel.",
        or_na(info.business.as_deref()),
        or_na(info.contact.as_deref()),
        partnership.contact_email,
        partnership.website,
        or_na(info.category.as_deref()),
        or_na(info.product.as_deref()),
        or_na(info.commission_offer.as_deref()),
        or_na(info.additional_info.as_deref()),
    );

    EmailMessage::new(
        &app.admin_notification_email,
        "New Business Partnership Request",
        body,
    )
}

/// 商家请求确认邮件
pub fn business_request_confirmation(app: &AppConfig, partnership: &Partnership) -> EmailMessage {
    let info: BusinessInfo = partnership.business_info();
    let body = format!(
        "Dear {},\n\nThank you for your interest in partnering with {}! We have received your request for {} and our team will review it shortly.\n\nBest regards,\n{}",
        or_na(info.contact.as_deref()),
        app.brand_name,
        or_na(info.business.as_deref()),
        app.team_signature
    );

    EmailMessage::new(
        &partnership.contact_email,
        format!("Your Partnership Request with {}", app.brand_name),
        body,
    )
}
