//! Redirect flow tests
//!
//! Resolver behaviour with test doubles, plus the `/go` and `/r` HTTP routes
//! against a real SQLite database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use affiliateaura::config::{StaticConfig, set_config};
use affiliateaura::errors::{AuraError, Result};
use affiliateaura::api::services::redirect_routes;
use affiliateaura::services::redirect::{LinkLookup, NotFoundReason};
use affiliateaura::services::{ClickContext, RedirectResolver, Resolution};
use affiliateaura::storage::{ClickEvent, ClickSink, LinkStatus, SeaOrmStorage, ShortLink};

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
        // 直接 307，插页由单元测试覆盖
        config.redirect.delay_ms = 0;
        set_config(config);
    });
}

async fn init_test_env() {
    init_static_config();

    RT_INIT
        .get_or_init(|| async {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let db_path = temp_dir.path().join("redirect_test.db");
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

fn make_link(code: &str, url: &str, status: LinkStatus) -> ShortLink {
    ShortLink {
        id: uuid::Uuid::new_v4().to_string(),
        code: code.to_string(),
        destination_url: url.to_string(),
        title: Some("Affiliate Link".to_string()),
        description: None,
        campaign: Some("default".to_string()),
        tags: vec![],
        status,
        click_count: 0,
        partner_id: None,
        partner_type: None,
        provider_link_id: None,
        provider_short_url: None,
        created_by: Some("owner@example.com".to_string()),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Test Doubles
// =============================================================================

struct StaticLookup(Option<ShortLink>);

#[async_trait]
impl LinkLookup for StaticLookup {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        Ok(self.0.clone().filter(|l| l.code == code))
    }
}

struct BrokenLookup;

#[async_trait]
impl LinkLookup for BrokenLookup {
    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortLink>> {
        Err(AuraError::database_connection("connection refused"))
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ClickEvent>>,
}

#[async_trait]
impl ClickSink for RecordingSink {
    async fn record_click(&self, event: ClickEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Default)]
struct FailingSink {
    calls: AtomicUsize,
}

#[async_trait]
impl ClickSink for FailingSink {
    async fn record_click(&self, _event: ClickEvent) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AuraError::database_operation("disk full"))
    }
}

// =============================================================================
// Resolver Tests
// =============================================================================

#[tokio::test]
async fn test_resolver_records_click_with_source() {
    let link = make_link("spring", "https://shop.example.com/sale", LinkStatus::Active);
    let sink = Arc::new(RecordingSink::default());
    let resolver = RedirectResolver::new(Arc::new(StaticLookup(Some(link.clone()))), sink.clone());

    let ctx = ClickContext {
        query: Some("utm_source=newsletter".to_string()),
        referrer: Some("https://blog.example.org/post".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
        ip_address: Some("203.0.113.9".to_string()),
    };
    let resolution = resolver.resolve(Some("spring"), ctx).await;

    assert_eq!(resolution, Resolution::Redirect(link.clone()));
    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].link_id, link.id);
    assert_eq!(events[0].source.as_deref(), Some("newsletter"));
    assert_eq!(events[0].referrer.as_deref(), Some("https://blog.example.org/post"));
    assert_eq!(events[0].ip_address.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn test_resolver_redirects_even_when_click_fails() {
    let link = make_link("spring", "https://shop.example.com/sale", LinkStatus::Active);
    let sink = Arc::new(FailingSink::default());
    let resolver = RedirectResolver::new(Arc::new(StaticLookup(Some(link.clone()))), sink.clone());

    let resolution = resolver.resolve(Some("spring"), ClickContext::default()).await;

    assert_eq!(resolution, Resolution::Redirect(link));
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_resolver_not_found_reasons() {
    let inactive = make_link("paused", "https://shop.example.com", LinkStatus::Inactive);
    let sink = Arc::new(RecordingSink::default());
    let resolver = RedirectResolver::new(Arc::new(StaticLookup(Some(inactive))), sink.clone());

    assert_eq!(
        resolver.resolve(None, ClickContext::default()).await,
        Resolution::NotFound(NotFoundReason::MissingCode)
    );
    assert_eq!(
        resolver.resolve(Some("   "), ClickContext::default()).await,
        Resolution::NotFound(NotFoundReason::MissingCode)
    );
    assert_eq!(
        resolver.resolve(Some("bad code!"), ClickContext::default()).await,
        Resolution::NotFound(NotFoundReason::InvalidCode)
    );
    assert_eq!(
        resolver.resolve(Some("missing"), ClickContext::default()).await,
        Resolution::NotFound(NotFoundReason::UnknownCode)
    );
    assert_eq!(
        resolver.resolve(Some("paused"), ClickContext::default()).await,
        Resolution::NotFound(NotFoundReason::Inactive)
    );

    // 未跳转的请求不计点击
    assert!(sink.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_resolver_lookup_failure() {
    let sink = Arc::new(RecordingSink::default());
    let resolver = RedirectResolver::new(Arc::new(BrokenLookup), sink.clone());

    assert_eq!(
        resolver.resolve(Some("spring"), ClickContext::default()).await,
        Resolution::Failed
    );
    assert!(sink.events.lock().unwrap().is_empty());
}

// =============================================================================
// HTTP Tests
// =============================================================================

macro_rules! redirect_app {
    () => {{
        let resolver = Arc::new(RedirectResolver::from_storage(get_storage()));
        test::init_service(
            App::new()
                .app_data(web::Data::new(resolver))
                .configure(redirect_routes),
        )
        .await
    }};
}

#[tokio::test]
async fn test_go_redirects_and_counts_click() {
    init_test_env().await;
    let storage = get_storage();
    let link = make_link("gohttp1", "https://shop.example.com/go", LinkStatus::Active);
    storage.insert_link(&link).await.expect("insert link");

    let app = redirect_app!();
    let req = TestRequest::get()
        .uri("/go/gohttp1?utm_source=twitter")
        .insert_header(("User-Agent", "integration-test"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "https://shop.example.com/go");

    let stored = storage.find_link_by_code("gohttp1").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 1);

    let breakdown = storage.click_breakdown(&stored, 10).await.unwrap();
    assert_eq!(breakdown.logged_clicks, 1);
    assert_eq!(breakdown.top_sources[0].name, "twitter");
}

#[tokio::test]
async fn test_r_alias_uses_same_resolver() {
    init_test_env().await;
    let storage = get_storage();
    let link = make_link("ralias1", "https://shop.example.com/r", LinkStatus::Active);
    storage.insert_link(&link).await.expect("insert link");

    let app = redirect_app!();
    for _ in 0..2 {
        let req = TestRequest::get().uri("/r/ralias1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    let stored = storage.find_link_by_code("ralias1").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 2);
}

#[tokio::test]
async fn test_unknown_code_returns_404_page() {
    init_test_env().await;
    let app = redirect_app!();

    let req = TestRequest::get().uri("/go/nope-nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("This link does not exist or has expired"));
    assert!(body.contains("/dashboard"));
}

#[tokio::test]
async fn test_missing_code_returns_invalid_link() {
    init_test_env().await;
    let app = redirect_app!();

    for uri in ["/go", "/go/", "/r"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri: {}", uri);

        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Invalid link"));
    }
}

#[tokio::test]
async fn test_inactive_link_is_not_followed() {
    init_test_env().await;
    let storage = get_storage();
    let link = make_link("paused1", "https://shop.example.com/paused", LinkStatus::Inactive);
    storage.insert_link(&link).await.expect("insert link");

    let app = redirect_app!();
    let req = TestRequest::get().uri("/go/paused1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let stored = storage.find_link_by_code("paused1").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 0);
}

#[tokio::test]
async fn test_head_request_redirects() {
    init_test_env().await;
    let storage = get_storage();
    let link = make_link("headreq1", "https://shop.example.com/head", LinkStatus::Active);
    storage.insert_link(&link).await.expect("insert link");

    let app = redirect_app!();
    let req = TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/go/headreq1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}
