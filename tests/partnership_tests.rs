//! Partnership workflow tests
//!
//! Request → admin review → notification, against SQLite with a recording
//! email sender in place of SMTP.

use std::sync::{Arc, Mutex, Once, OnceLock};

use async_trait::async_trait;
use tempfile::TempDir;

use affiliateaura::config::{StaticConfig, set_config};
use affiliateaura::errors::{AuraError, Result};
use affiliateaura::services::partnership_service::{
    AdminEmailRequest, AffiliateRequest, BusinessRequest,
};
use affiliateaura::services::{AdminAction, EmailMessage, EmailSender, Identity, PartnershipService};
use affiliateaura::storage::{PartnerType, PartnershipStatus, SeaOrmStorage};

// =============================================================================
// Test Setup
// =============================================================================

static INIT: Once = Once::new();
static TEST_DIR: OnceLock<TempDir> = OnceLock::new();
static RT_INIT: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
static STORAGE: OnceLock<Arc<SeaOrmStorage>> = OnceLock::new();

const ADMIN: &str = "admin@example.com";

fn init_static_config() {
    INIT.call_once(|| {
        let mut config = StaticConfig::default();
        config.auth.admin_email = ADMIN.to_string();
        set_config(config);
    });
}

async fn init_test_env() {
    init_static_config();

    RT_INIT
        .get_or_init(|| async {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let db_path = temp_dir.path().join("partnership_test.db");
            let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

            let storage = SeaOrmStorage::new(&db_url, "sqlite")
                .await
                .expect("Failed to create storage");
            let _ = STORAGE.set(Arc::new(storage));
            let _ = TEST_DIR.set(temp_dir);
        })
        .await;
}

fn get_storage() -> Arc<SeaOrmStorage> {
    STORAGE.get().expect("Storage not initialized").clone()
}

fn admin() -> Identity {
    Identity {
        email: ADMIN.to_string(),
        name: Some("Admin".to_string()),
        is_admin: true,
    }
}

fn user(email: &str) -> Identity {
    Identity {
        email: email.to_string(),
        name: None,
        is_admin: false,
    }
}

fn business_request(name: &str) -> BusinessRequest {
    BusinessRequest {
        business_name: name.to_string(),
        contact_name: "Jane Doe".to_string(),
        contact_email: "jane@acme.example".to_string(),
        website: "acme.example".to_string(),
        product_description: "Outdoor gear".to_string(),
        commission_offer: "15% per sale".to_string(),
        additional_info: None,
        category: Some("Outdoors".to_string()),
    }
}

// =============================================================================
// Email Doubles
// =============================================================================

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingSender {
    fn take(&self) -> Vec<EmailMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct FailingSender;

#[async_trait]
impl EmailSender for FailingSender {
    async fn send(&self, _message: &EmailMessage) -> Result<()> {
        Err(AuraError::email_delivery("connection reset"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// =============================================================================
// Request Tests
// =============================================================================

#[tokio::test]
async fn test_business_request_is_pending_review_with_notes() {
    init_test_env().await;
    let sender = Arc::new(RecordingSender::default());
    let service = PartnershipService::new(get_storage(), sender.clone());

    let p = service
        .request_business(None, business_request("Acme Outdoors"))
        .await
        .expect("business request");

    assert_eq!(p.status, PartnershipStatus::PendingReview);
    assert_eq!(p.partner_type, Some(PartnerType::Business));
    assert_eq!(p.website, "https://acme.example");
    assert!(p.created_by.is_none());
    let notes = p.notes.as_deref().unwrap();
    assert!(notes.starts_with("Business: Acme Outdoors\n"));
    assert!(notes.contains("Category: Outdoors"));

    let stored = get_storage().get_partnership(&p.id).await.unwrap().unwrap();
    assert_eq!(stored.business_info().business.as_deref(), Some("Acme Outdoors"));

    // 管理员通知 + 申请人确认
    let sent = sender.take();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|m| m.to == "jane@acme.example"));
}

#[tokio::test]
async fn test_business_request_requires_fields() {
    init_test_env().await;
    let service = PartnershipService::new(get_storage(), Arc::new(RecordingSender::default()));

    let mut req = business_request("Acme");
    req.product_description = "   ".to_string();
    let err = service.request_business(None, req).await.unwrap_err();
    assert!(matches!(err, AuraError::Validation(_)));

    let mut req = business_request("Acme");
    req.contact_email = "not-an-email".to_string();
    let err = service.request_business(None, req).await.unwrap_err();
    assert!(matches!(err, AuraError::Validation(_)));
}

#[tokio::test]
async fn test_affiliate_request_validates_commission() {
    init_test_env().await;
    let service = PartnershipService::new(get_storage(), Arc::new(RecordingSender::default()));
    let me = user("aff-commission@example.com");

    let err = service
        .request_affiliate(
            &me,
            AffiliateRequest {
                website: "https://blog.example.com".to_string(),
                contact_email: "owner@blog.example.com".to_string(),
                commission_rate: Some(120.0),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::Validation(_)));
}

#[tokio::test]
async fn test_affiliate_request_visible_to_creator() {
    init_test_env().await;
    let sender = Arc::new(RecordingSender::default());
    let service = PartnershipService::new(get_storage(), sender.clone());
    let me = user("aff-visible@example.com");

    let p = service
        .request_affiliate(
            &me,
            AffiliateRequest {
                website: "https://blog.example.com".to_string(),
                contact_email: "owner@blog.example.com".to_string(),
                commission_rate: Some(12.5),
                notes: Some("Tech reviews".to_string()),
            },
        )
        .await
        .expect("affiliate request");

    assert_eq!(p.status, PartnershipStatus::Pending);
    assert_eq!(p.created_by.as_deref(), Some("aff-visible@example.com"));
    // 外联邮件 + 无资料时默认发确认
    assert_eq!(sender.take().len(), 2);

    let mine = service.visible_for(&me).await.unwrap();
    assert!(mine.iter().any(|x| x.id == p.id));

    let other = service.visible_for(&user("stranger@example.com")).await.unwrap();
    assert!(!other.iter().any(|x| x.id == p.id));
}

// =============================================================================
// Admin Review Tests
// =============================================================================

#[tokio::test]
async fn test_approve_sends_exactly_one_email() {
    init_test_env().await;
    let sender = Arc::new(RecordingSender::default());
    let service = PartnershipService::new(get_storage(), sender.clone());

    let p = service
        .request_business(None, business_request("Approve Me"))
        .await
        .unwrap();
    sender.take();

    let updated = service
        .apply_action(&admin(), &p.id, AdminAction::Approve)
        .await
        .expect("approve");
    assert_eq!(updated.status, PartnershipStatus::Active);
    assert!(updated.updated_at >= p.updated_at);

    let sent = sender.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@acme.example");
    assert!(sent[0].subject.ends_with("ACTIVE"));
}

#[tokio::test]
async fn test_status_survives_email_failure() {
    init_test_env().await;
    let storage = get_storage();
    let quiet = PartnershipService::new(storage.clone(), Arc::new(RecordingSender::default()));
    let p = quiet
        .request_business(None, business_request("Flaky Mail"))
        .await
        .unwrap();

    let service = PartnershipService::new(storage.clone(), Arc::new(FailingSender));
    let updated = service
        .apply_action(&admin(), &p.id, AdminAction::Approve)
        .await
        .expect("approve despite email failure");
    assert_eq!(updated.status, PartnershipStatus::Active);

    let stored = storage.get_partnership(&p.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PartnershipStatus::Active);
}

#[tokio::test]
async fn test_full_lifecycle_and_invalid_transitions() {
    init_test_env().await;
    let service = PartnershipService::new(get_storage(), Arc::new(RecordingSender::default()));
    let p = service
        .request_business(None, business_request("Lifecycle"))
        .await
        .unwrap();
    let admin = admin();

    let err = service
        .apply_action(&admin, &p.id, AdminAction::Reactivate)
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::InvalidTransition(_)));

    let p1 = service.apply_action(&admin, &p.id, AdminAction::Approve).await.unwrap();
    assert_eq!(p1.status, PartnershipStatus::Active);
    let p2 = service.apply_action(&admin, &p.id, AdminAction::Deactivate).await.unwrap();
    assert_eq!(p2.status, PartnershipStatus::Rejected);
    let p3 = service.apply_action(&admin, &p.id, AdminAction::Reactivate).await.unwrap();
    assert_eq!(p3.status, PartnershipStatus::Active);

    let err = service
        .apply_action(&admin, &p.id, AdminAction::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_non_admin_cannot_review() {
    init_test_env().await;
    let sender = Arc::new(RecordingSender::default());
    let service = PartnershipService::new(get_storage(), sender.clone());
    let p = service
        .request_business(None, business_request("Forbidden"))
        .await
        .unwrap();
    sender.take();

    let err = service
        .apply_action(&user("someone@example.com"), &p.id, AdminAction::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::Forbidden(_)));
    assert!(sender.take().is_empty());

    let err = service
        .admin_overview(&user("someone@example.com"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::Forbidden(_)));
}

#[tokio::test]
async fn test_unknown_partnership_is_not_found() {
    init_test_env().await;
    let service = PartnershipService::new(get_storage(), Arc::new(RecordingSender::default()));

    let err = service
        .apply_action(&admin(), "does-not-exist", AdminAction::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::NotFound(_)));
}

#[tokio::test]
async fn test_admin_overview_groups_and_search() {
    init_test_env().await;
    let service = PartnershipService::new(get_storage(), Arc::new(RecordingSender::default()));
    let p = service
        .request_business(None, business_request("Zebra Searchable Goods"))
        .await
        .unwrap();

    let overview = service
        .admin_overview(&admin(), Some("zebra searchable"))
        .await
        .unwrap();
    assert_eq!(overview.pending.businesses.len(), 1);
    assert_eq!(overview.pending.businesses[0].id, p.id);
    assert!(overview.active.is_empty());
    assert!(overview.rejected.is_empty());

    service.apply_action(&admin(), &p.id, AdminAction::Reject).await.unwrap();
    let overview = service
        .admin_overview(&admin(), Some("zebra searchable"))
        .await
        .unwrap();
    assert!(overview.pending.is_empty());
    assert_eq!(overview.rejected.businesses.len(), 1);
}

#[tokio::test]
async fn test_admin_email_surfaces_delivery_errors() {
    init_test_env().await;
    let service = PartnershipService::new(get_storage(), Arc::new(FailingSender));

    let err = service
        .send_admin_email(
            &admin(),
            AdminEmailRequest {
                to: "partner@example.com".to_string(),
                subject: "Hello".to_string(),
                body: "Checking in".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::EmailDelivery(_)));
}
