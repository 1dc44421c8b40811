//! Click analytics tests
//!
//! Visits go through `UrlService::redirect`, the same path the HTTP handler uses.

mod common;

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use linkpulse::errors::AppError;
use linkpulse::services::{CreateUrlRequest, GeoLookup, UrlService, Visitor};
use linkpulse::storage::{MemoryStore, ShortUrl, Store, StoreResult, User};
use linkpulse::utils::Deadline;

use common::{StalledGeoLookup, StaticGeoLookup, memory_store, sqlite_store, url_service};

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const WINDOWS_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

async fn seeded_service(store: Arc<dyn Store>, geo: Arc<dyn GeoLookup>) -> UrlService {
    let urls = url_service(store, geo);
    urls.create_url(
        "owner",
        CreateUrlRequest {
            label: "docs".to_string(),
            long_url: "https://example.com/docs".to_string(),
            short_key: "docs".to_string(),
        },
        Deadline::default(),
    )
    .await
    .unwrap();
    urls
}

fn visitor(ua: Option<&str>) -> Visitor {
    Visitor {
        ip: Some("8.8.8.8".parse::<IpAddr>().unwrap()),
        user_agent: ua.map(str::to_string),
    }
}

async fn concurrent_visits(urls: UrlService, n: usize) {
    let mut handles = Vec::with_capacity(n);
    for i in 0..n {
        let urls = urls.clone();
        let ua = if i % 2 == 0 { IPHONE_UA } else { WINDOWS_UA };
        handles.push(tokio::spawn(async move {
            urls.redirect(
                "docs",
                visitor(Some(ua)),
                Deadline::after(Duration::from_secs(10)),
            )
            .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}

// =============================================================================
// Counter invariants
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_memory() {
    let store = memory_store();
    let urls = seeded_service(store.clone(), Arc::new(StaticGeoLookup::city("Berlin"))).await;

    concurrent_visits(urls.clone(), 64).await;

    let list = urls.list_urls("owner", Deadline::default()).await.unwrap();
    let url = &list[0];
    assert_eq!(url.no_of_clicks, 64);
    assert_eq!(url.device.values().sum::<u64>(), 64);
    assert_eq!(url.location.values().sum::<u64>(), 64);
    assert_eq!(url.device.get("iPhone"), Some(&32));
    assert_eq!(url.location.get("Berlin"), Some(&64));
    assert!(url.counters_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_sqlite() {
    let (store, _dir) = sqlite_store().await;
    let urls = seeded_service(store.clone(), Arc::new(StaticGeoLookup::city("Berlin"))).await;

    concurrent_visits(urls.clone(), 24).await;

    let list = urls.list_urls("owner", Deadline::default()).await.unwrap();
    let url = &list[0];
    assert_eq!(url.no_of_clicks, 24);
    assert_eq!(url.device.values().sum::<u64>(), 24);
    assert_eq!(url.location.get("Berlin"), Some(&24));
    assert!(url.counters_consistent());
}

// =============================================================================
// Labels
// =============================================================================

#[tokio::test]
async fn test_redirect_returns_target_and_updated_counts() {
    let urls = seeded_service(memory_store(), Arc::new(StaticGeoLookup::city("Paris"))).await;

    let url = urls
        .redirect("docs", visitor(Some(WINDOWS_UA)), Deadline::default())
        .await
        .unwrap();
    assert_eq!(url.long_url, "https://example.com/docs");
    assert_eq!(url.no_of_clicks, 1);
    assert_eq!(url.location.get("Paris"), Some(&1));
}

#[tokio::test]
async fn test_missing_user_agent_uses_fallback_device() {
    let urls = seeded_service(memory_store(), Arc::new(StaticGeoLookup::unknown())).await;

    let url = urls
        .redirect("docs", visitor(None), Deadline::default())
        .await
        .unwrap();
    assert_eq!(url.device.get("Android"), Some(&1));
    assert_eq!(url.location.get("unknown"), Some(&1));
}

#[tokio::test]
async fn test_missing_client_ip_is_unknown_location() {
    let urls = seeded_service(memory_store(), Arc::new(StaticGeoLookup::city("Berlin"))).await;

    let url = urls
        .redirect(
            "docs",
            Visitor {
                ip: None,
                user_agent: Some(IPHONE_UA.to_string()),
            },
            Deadline::default(),
        )
        .await
        .unwrap();
    assert_eq!(url.location.get("unknown"), Some(&1));
}

#[tokio::test]
async fn test_stalled_geo_lookup_is_abandoned() {
    let urls = seeded_service(memory_store(), Arc::new(StalledGeoLookup)).await;

    let started = Instant::now();
    let url = urls
        .redirect(
            "docs",
            visitor(Some(IPHONE_UA)),
            Deadline::after(Duration::from_millis(400)),
        )
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(url.no_of_clicks, 1);
    assert_eq!(url.location.get("unknown"), Some(&1));
}

#[tokio::test]
async fn test_unknown_key_is_not_found_and_records_nothing() {
    let store = memory_store();
    let urls = seeded_service(store.clone(), Arc::new(StaticGeoLookup::unknown())).await;

    let err = urls
        .redirect("missing", visitor(None), Deadline::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let list = urls.list_urls("owner", Deadline::default()).await.unwrap();
    assert_eq!(list[0].no_of_clicks, 0);
    assert_eq!(store.count_urls_by_key("missing").await.unwrap(), 0);
}

/// 统计 `count_urls_by_key` 调用次数的 MemoryStore 包装
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    key_lookups: AtomicUsize,
}

#[async_trait]
impl Store for CountingStore {
    fn backend_name(&self) -> &'static str {
        "counting"
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.inner.insert_user(user).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_id(user_id).await
    }

    async fn update_user_refresh_token(
        &self,
        user_id: &str,
        token: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner
            .update_user_refresh_token(user_id, token, issued_at)
            .await
    }

    async fn count_users_by_email(&self, email: &str) -> StoreResult<u64> {
        self.inner.count_users_by_email(email).await
    }

    async fn insert_url(&self, url: &ShortUrl) -> StoreResult<()> {
        self.inner.insert_url(url).await
    }

    async fn count_urls_by_key(&self, key: &str) -> StoreResult<u64> {
        self.key_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.count_urls_by_key(key).await
    }

    async fn find_urls_by_owner(&self, user_id: &str) -> StoreResult<Vec<ShortUrl>> {
        self.inner.find_urls_by_owner(user_id).await
    }

    async fn increment_url_counters(
        &self,
        key: &str,
        device: &str,
        location: &str,
    ) -> StoreResult<Option<ShortUrl>> {
        self.inner.increment_url_counters(key, device, location).await
    }

    async fn close(&self) -> StoreResult<()> {
        self.inner.close().await
    }
}

#[tokio::test]
async fn test_visit_looks_up_key_once() {
    let store = Arc::new(CountingStore::default());
    let urls = seeded_service(store.clone(), Arc::new(StaticGeoLookup::city("Pune"))).await;
    let before = store.key_lookups.load(Ordering::SeqCst);

    urls.redirect("docs", visitor(Some(WINDOWS_UA)), Deadline::default())
        .await
        .unwrap();
    assert_eq!(store.key_lookups.load(Ordering::SeqCst) - before, 1);

    urls.redirect("missing", visitor(None), Deadline::default())
        .await
        .unwrap_err();
    assert_eq!(store.key_lookups.load(Ordering::SeqCst) - before, 2);
}
