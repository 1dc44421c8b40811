//! Storage backend tests
//!
//! Tests for SeaOrmStore using temporary SQLite databases.

mod common;

use chrono::{Duration, Utc};
use linkpulse::config::DatabaseConfig;
use linkpulse::storage::{ShortUrl, Store, StoreError, StoreFactory, User};

use common::sqlite_store;

fn test_user(email: &str) -> User {
    User::new(
        "Test User".to_string(),
        email.to_string(),
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
    )
}

fn test_url(owner: &str, key: &str) -> ShortUrl {
    ShortUrl::new(
        owner.to_string(),
        format!("label {}", key),
        format!("https://{}.example.com", key),
        key.to_string(),
    )
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_roundtrip() {
    let (store, _dir) = sqlite_store().await;
    let user = test_user("a@x.com");
    store.insert_user(&user).await.unwrap();

    let by_email = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.full_name, "Test User");
    assert!(by_email.refresh_token.is_none());

    let by_id = store.find_user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "a@x.com");

    assert!(store.find_user_by_email("b@x.com").await.unwrap().is_none());
    assert_eq!(store.count_users_by_email("a@x.com").await.unwrap(), 1);
    assert_eq!(store.count_users_by_email("b@x.com").await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_email_is_duplicate_error() {
    let (store, _dir) = sqlite_store().await;
    store.insert_user(&test_user("a@x.com")).await.unwrap();

    let err = store.insert_user(&test_user("a@x.com")).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_refresh_token_update() {
    let (store, _dir) = sqlite_store().await;
    let user = test_user("a@x.com");
    store.insert_user(&user).await.unwrap();

    store
        .update_user_refresh_token(&user.id, Some("refresh-1"), Utc::now())
        .await
        .unwrap();
    let stored = store.find_user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
    assert!(stored.refresh_token_issued_at.is_some());

    store
        .update_user_refresh_token(&user.id, None, Utc::now())
        .await
        .unwrap();
    let stored = store.find_user_by_id(&user.id).await.unwrap().unwrap();
    assert!(stored.refresh_token.is_none());

    assert!(
        store
            .update_user_refresh_token("no-such-user", None, Utc::now())
            .await
            .is_err()
    );
}

// =============================================================================
// Short URLs
// =============================================================================

#[tokio::test]
async fn test_refresh_token_update_for_missing_user() {
    let (store, _dir) = sqlite_store().await;
    let err = store
        .update_user_refresh_token("ghost-user", None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_duplicate_short_key_is_duplicate_error() {
    let (store, _dir) = sqlite_store().await;
    store.insert_url(&test_url("u1", "promo")).await.unwrap();

    let err = store.insert_url(&test_url("u2", "promo")).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)), "got {:?}", err);
    assert_eq!(store.count_urls_by_key("promo").await.unwrap(), 1);
}

#[tokio::test]
async fn test_find_urls_by_owner_includes_buckets() {
    let (store, _dir) = sqlite_store().await;
    let first = test_url("u1", "first");
    let mut second = test_url("u1", "second");
    second.created_at = first.created_at + Duration::seconds(1);
    // 插入顺序与创建时间相反，结果仍按创建时间排序
    store.insert_url(&second).await.unwrap();
    store.insert_url(&first).await.unwrap();
    store.insert_url(&test_url("u2", "other")).await.unwrap();

    store
        .increment_url_counters("first", "Windows 10", "Berlin")
        .await
        .unwrap();
    store
        .increment_url_counters("first", "iPhone", "Berlin")
        .await
        .unwrap();

    let urls = store.find_urls_by_owner("u1").await.unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0].short_url_key, "first");
    assert_eq!(urls[0].no_of_clicks, 2);
    assert_eq!(urls[0].device.get("iPhone"), Some(&1));
    assert_eq!(urls[0].location.get("Berlin"), Some(&2));
    assert!(urls[0].counters_consistent());
    assert_eq!(urls[1].no_of_clicks, 0);
    assert!(urls[1].device.is_empty());

    assert!(store.find_urls_by_owner("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_increment_missing_key_changes_nothing() {
    let (store, _dir) = sqlite_store().await;
    let result = store
        .increment_url_counters("ghost", "Linux", "Berlin")
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(store.count_urls_by_key("ghost").await.unwrap(), 0);
}

// =============================================================================
// Factory
// =============================================================================

#[tokio::test]
async fn test_factory_selects_backend() {
    let memory = StoreFactory::connect(&DatabaseConfig {
        database_url: "memory://".to_string(),
        ..DatabaseConfig::default()
    })
    .await
    .unwrap();
    assert_eq!(memory.backend_name(), "memory");

    let dir = tempfile::TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("f.db").display());
    let sqlite = StoreFactory::connect(&DatabaseConfig {
        database_url: url,
        ..DatabaseConfig::default()
    })
    .await
    .unwrap();
    assert_eq!(sqlite.backend_name(), "sqlite");
    sqlite.close().await.unwrap();

    let err = StoreFactory::connect(&DatabaseConfig {
        database_url: "mongodb://localhost".to_string(),
        ..DatabaseConfig::default()
    })
    .await
    .err()
    .unwrap();
    assert!(matches!(err, StoreError::Backend(_)));
}
