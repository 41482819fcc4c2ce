//! Link service tests
//!
//! Creation, ownership checks and shortener registration against SQLite.

use std::sync::{Arc, Mutex, Once, OnceLock};

use async_trait::async_trait;
use tempfile::TempDir;

use affiliateaura::config::{StaticConfig, set_config};
use affiliateaura::errors::{AuraError, Result};
use affiliateaura::services::link_service::{DEFAULT_CAMPAIGN, DEFAULT_TITLE, TagsInput};
use affiliateaura::services::shortener::{
    CreateShortLinkRequest, ProviderLink, ProviderStats, ShortenerProvider,
};
use affiliateaura::services::{CreateLinkRequest, Identity, LinkService, ShortenerService};
use affiliateaura::storage::backend::ProfilePatch;
use affiliateaura::metadata::BusinessInfo;
use affiliateaura::storage::{
    ClickEvent, ClickSink, LinkStatus, PartnerType, Partnership, PartnershipStatus, SeaOrmStorage,
};

// =============================================================================
// Test Setup
// =============================================================================

static INIT: Once = Once::new();
static TEST_DIR: OnceLock<TempDir> = OnceLock::new();
static RT_INIT: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
static STORAGE: OnceLock<Arc<SeaOrmStorage>> = OnceLock::new();

fn init_static_config() {
    INIT.call_once(|| {
        let mut config = StaticConfig::default();
        config.app.public_base_url = "https://aura.example".to_string();
        set_config(config);
    });
}

async fn init_test_env() {
    init_static_config();

    RT_INIT
        .get_or_init(|| async {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let db_path = temp_dir.path().join("link_service_test.db");
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

fn user(email: &str) -> Identity {
    Identity {
        email: email.to_string(),
        name: None,
        is_admin: false,
    }
}

fn admin() -> Identity {
    Identity {
        email: "admin@example.com".to_string(),
        name: None,
        is_admin: true,
    }
}

fn request(url: &str) -> CreateLinkRequest {
    CreateLinkRequest {
        destination_url: url.to_string(),
        code: None,
        title: None,
        description: None,
        campaign: None,
        tags: None,
        partner_id: None,
    }
}

fn plain_service() -> LinkService {
    LinkService::new(get_storage(), Arc::new(ShortenerService::disabled()))
}

// =============================================================================
// Shortener Doubles
// =============================================================================

#[derive(Default)]
struct RecordingProvider {
    created: Mutex<Vec<CreateShortLinkRequest>>,
}

#[async_trait]
impl ShortenerProvider for RecordingProvider {
    async fn create_short_link(&self, request: &CreateShortLinkRequest) -> Result<ProviderLink> {
        self.created.lock().unwrap().push(request.clone());
        let key = request.key.clone().unwrap_or_default();
        Ok(ProviderLink {
            short_url: format!("https://dub.example/{}", key),
            link_id: format!("link_{}", key),
        })
    }

    async fn get_stats(&self, _link_id: &str) -> Result<ProviderStats> {
        Ok(ProviderStats::default())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct DownProvider;

#[async_trait]
impl ShortenerProvider for DownProvider {
    async fn create_short_link(&self, _request: &CreateShortLinkRequest) -> Result<ProviderLink> {
        Err(AuraError::external_service("503 Service Unavailable"))
    }

    async fn get_stats(&self, _link_id: &str) -> Result<ProviderStats> {
        Err(AuraError::external_service("503 Service Unavailable"))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

// =============================================================================
// Creation Tests
// =============================================================================

#[tokio::test]
async fn test_create_applies_defaults() {
    init_test_env().await;
    let me = user("defaults@example.com");

    let created = plain_service()
        .create(&me, request("shop.example.com/sale"))
        .await
        .expect("create link");
    let link = &created.link;

    assert_eq!(link.destination_url, "https://shop.example.com/sale");
    assert_eq!(link.title.as_deref(), Some(DEFAULT_TITLE));
    assert_eq!(link.campaign.as_deref(), Some(DEFAULT_CAMPAIGN));
    assert_eq!(link.status, LinkStatus::Active);
    assert_eq!(link.click_count, 0);
    assert_eq!(link.created_by.as_deref(), Some("defaults@example.com"));
    assert!(!link.code.is_empty());
    assert!(link.provider_short_url.is_none());

    assert_eq!(
        created.redirect_url,
        format!("https://aura.example/go/{}?campaign=default", link.code)
    );

    let stored = get_storage().find_link_by_code(&link.code).await.unwrap();
    assert_eq!(stored.as_ref().map(|l| l.id.as_str()), Some(link.id.as_str()));
}

#[tokio::test]
async fn test_create_with_custom_code_and_tags() {
    init_test_env().await;
    let me = user("custom@example.com");

    let mut req = request("https://shop.example.com/winter");
    req.code = Some("winter-2026".to_string());
    req.campaign = Some("holiday sale".to_string());
    req.tags = Some(TagsInput::Csv("winter, outdoor,".to_string()));

    let created = plain_service().create(&me, req).await.expect("create link");
    assert_eq!(created.link.code, "winter-2026");
    assert_eq!(created.link.tags, vec!["winter", "outdoor"]);
    assert!(created.redirect_url.ends_with("/go/winter-2026?campaign=holiday%20sale"));
}

#[tokio::test]
async fn test_create_rejects_duplicate_code() {
    init_test_env().await;
    let me = user("dup@example.com");
    let service = plain_service();

    let mut req = request("https://shop.example.com/a");
    req.code = Some("dupcode".to_string());
    service.create(&me, req.clone()).await.expect("first create");

    let err = service.create(&me, req).await.unwrap_err();
    assert!(matches!(err, AuraError::Conflict(_)));
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    init_test_env().await;
    let me = user("bad@example.com");
    let service = plain_service();

    let err = service
        .create(&me, request("javascript:alert(1)"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::Validation(_)));

    let mut req = request("https://shop.example.com");
    req.code = Some("has space".to_string());
    let err = service.create(&me, req).await.unwrap_err();
    assert!(matches!(err, AuraError::Validation(_)));

    let mut req = request("https://shop.example.com");
    req.partner_id = Some("no-such-partner".to_string());
    let err = service.create(&me, req).await.unwrap_err();
    assert!(matches!(err, AuraError::NotFound(_)));
}

#[tokio::test]
async fn test_create_only_links_active_partners() {
    init_test_env().await;
    let storage = get_storage();
    let service = plain_service();
    let me = user("partner-linker@example.com");

    let now = chrono::Utc::now();
    let partner = Partnership {
        id: uuid::Uuid::new_v4().to_string(),
        website: "https://pending-partner.example".to_string(),
        contact_email: "owner@pending-partner.example".to_string(),
        partner_type: Some(PartnerType::Business),
        status: PartnershipStatus::PendingReview,
        notes: None,
        commission_rate: None,
        info: BusinessInfo::default(),
        last_contact_date: None,
        created_by: None,
        created_at: now,
        updated_at: now,
    };
    storage.insert_partnership(&partner).await.unwrap();

    for status in [
        PartnershipStatus::PendingReview,
        PartnershipStatus::Rejected,
        PartnershipStatus::Expired,
    ] {
        storage
            .update_partnership_status(&partner.id, status, now)
            .await
            .unwrap();
        let mut req = request("https://pending-partner.example/deal");
        req.partner_id = Some(partner.id.clone());
        let err = service.create(&me, req).await.unwrap_err();
        assert!(matches!(err, AuraError::Validation(_)), "status: {}", status);
    }

    storage
        .update_partnership_status(&partner.id, PartnershipStatus::Active, now)
        .await
        .unwrap();
    let mut req = request("https://pending-partner.example/deal");
    req.partner_id = Some(partner.id.clone());
    let created = service.create(&me, req).await.expect("active partner links");
    assert_eq!(created.link.partner_id.as_deref(), Some(partner.id.as_str()));
    assert_eq!(created.link.partner_type, Some(PartnerType::Business));
}

#[tokio::test]
async fn test_create_registers_with_shortener() {
    init_test_env().await;
    let me = user("shortener-on@example.com");
    let provider = Arc::new(RecordingProvider::default());
    let shortener = ShortenerService::new(Some(provider.clone() as Arc<dyn ShortenerProvider>), 60);
    let service = LinkService::new(get_storage(), Arc::new(shortener));

    let created = service
        .create(&me, request("https://shop.example.com/dub"))
        .await
        .expect("create link");

    let calls = provider.created.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "https://shop.example.com/dub");
    let key = calls[0].key.clone().unwrap();
    assert_eq!(key.len(), 6);
    assert_eq!(key, key.to_lowercase());

    assert_eq!(
        created.link.provider_short_url,
        Some(format!("https://dub.example/{}", key))
    );
    let stored = get_storage().get_link(&created.link.id).await.unwrap().unwrap();
    assert_eq!(stored.provider_link_id, Some(format!("link_{}", key)));
}

#[tokio::test]
async fn test_shortener_skipped_when_user_disabled_it() {
    init_test_env().await;
    let me = user("shortener-off@example.com");
    let storage = get_storage();
    let users = affiliateaura::services::UserService::new(storage.clone());
    users.ensure_profile(&me).await.expect("profile");
    storage
        .update_profile(
            &me.email,
            &ProfilePatch {
                shortener_enabled: Some(false),
                ..Default::default()
            },
        )
        .await
        .expect("disable shortener");

    let provider = Arc::new(RecordingProvider::default());
    let shortener = ShortenerService::new(Some(provider.clone() as Arc<dyn ShortenerProvider>), 60);
    let service = LinkService::new(storage, Arc::new(shortener));

    let created = service
        .create(&me, request("https://shop.example.com/off"))
        .await
        .expect("create link");
    assert!(created.link.provider_short_url.is_none());
    assert!(provider.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shortener_failure_is_not_fatal() {
    init_test_env().await;
    let me = user("shortener-down@example.com");
    let shortener = ShortenerService::new(Some(Arc::new(DownProvider) as Arc<dyn ShortenerProvider>), 60);
    let service = LinkService::new(get_storage(), Arc::new(shortener));

    let created = service
        .create(&me, request("https://shop.example.com/down"))
        .await
        .expect("link is still created");
    assert!(created.link.provider_short_url.is_none());
    assert!(get_storage().get_link(&created.link.id).await.unwrap().is_some());
}

// =============================================================================
// Ownership Tests
// =============================================================================

#[tokio::test]
async fn test_list_mine_only_returns_own_links() {
    init_test_env().await;
    let service = plain_service();
    let alice = user("alice-list@example.com");
    let bob = user("bob-list@example.com");

    let a = service.create(&alice, request("https://a.example")).await.unwrap();
    let b = service.create(&bob, request("https://b.example")).await.unwrap();

    let mine = service.list_mine(&alice).await.unwrap();
    assert!(mine.iter().any(|l| l.id == a.link.id));
    assert!(!mine.iter().any(|l| l.id == b.link.id));

    let err = service.list_all(&alice).await.unwrap_err();
    assert!(matches!(err, AuraError::Forbidden(_)));
    let all = service.list_all(&admin()).await.unwrap();
    assert!(all.iter().any(|l| l.id == a.link.id));
    assert!(all.iter().any(|l| l.id == b.link.id));
}

#[tokio::test]
async fn test_delete_requires_owner_or_admin() {
    init_test_env().await;
    let service = plain_service();
    let owner = user("owner-del@example.com");
    let other = user("other-del@example.com");

    let first = service.create(&owner, request("https://del.example/1")).await.unwrap();
    let err = service.delete(&other, &first.link.id).await.unwrap_err();
    assert!(matches!(err, AuraError::Forbidden(_)));

    service.delete(&owner, &first.link.id).await.expect("owner delete");
    assert!(get_storage().get_link(&first.link.id).await.unwrap().is_none());

    let second = service.create(&owner, request("https://del.example/2")).await.unwrap();
    service.delete(&admin(), &second.link.id).await.expect("admin delete");

    let err = service.delete(&owner, &second.link.id).await.unwrap_err();
    assert!(matches!(err, AuraError::NotFound(_)));
}

#[tokio::test]
async fn test_click_breakdown_for_owner() {
    init_test_env().await;
    let storage = get_storage();
    let service = plain_service();
    let owner = user("owner-clicks@example.com");

    let created = service.create(&owner, request("https://clicks.example")).await.unwrap();
    for source in ["newsletter", "newsletter", "direct"] {
        storage
            .record_click(ClickEvent {
                link_id: created.link.id.clone(),
                code: created.link.code.clone(),
                referrer: None,
                user_agent: None,
                ip_address: None,
                source: Some(source.to_string()),
            })
            .await
            .unwrap();
    }

    let breakdown = service.click_breakdown(&owner, &created.link.id).await.unwrap();
    assert_eq!(breakdown.total_clicks, 3);
    assert_eq!(breakdown.logged_clicks, 3);
    assert_eq!(breakdown.top_sources[0].name, "newsletter");
    assert_eq!(breakdown.top_sources[0].count, 2);

    let err = service
        .click_breakdown(&user("nosy@example.com"), &created.link.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AuraError::Forbidden(_)));
}

#[tokio::test]
async fn test_delete_removes_click_logs() {
    init_test_env().await;
    let storage = get_storage();
    let service = plain_service();
    let owner = user("owner-purge@example.com");

    let created = service.create(&owner, request("https://purge.example")).await.unwrap();
    for _ in 0..2 {
        storage
            .record_click(ClickEvent {
                link_id: created.link.id.clone(),
                code: created.link.code.clone(),
                referrer: Some("https://news.example".to_string()),
                user_agent: None,
                ip_address: None,
                source: None,
            })
            .await
            .unwrap();
    }
    let before = storage.click_breakdown(&created.link, 5).await.unwrap();
    assert_eq!(before.logged_clicks, 2);

    service.delete(&owner, &created.link.id).await.expect("owner delete");

    let after = storage.click_breakdown(&created.link, 5).await.unwrap();
    assert_eq!(after.logged_clicks, 0);
    assert!(after.top_referrers.is_empty());
}
