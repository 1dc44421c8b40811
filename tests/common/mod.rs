//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use linkpulse::auth::{JwtService, SessionManager, TokenIssuer};
use linkpulse::config::AppConfig;
use linkpulse::services::{AccountService, GeoInfo, GeoLookup, UrlService, VisitPolicy};
use linkpulse::storage::{MemoryStore, SeaOrmStore, Store};

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";

/// 固定返回同一个位置的 GeoLookup
pub struct StaticGeoLookup {
    pub info: Option<GeoInfo>,
}

impl StaticGeoLookup {
    pub fn city(city: &str) -> Self {
        Self {
            info: Some(GeoInfo {
                country: Some("Testland".to_string()),
                city: Some(city.to_string()),
            }),
        }
    }

    pub fn unknown() -> Self {
        Self { info: None }
    }
}

#[async_trait]
impl GeoLookup for StaticGeoLookup {
    async fn lookup(&self, _ip: IpAddr) -> Option<GeoInfo> {
        self.info.clone()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// 永远不返回的 GeoLookup，用于验证查询会被截止时间丢弃
pub struct StalledGeoLookup;

#[async_trait]
impl GeoLookup for StalledGeoLookup {
    async fn lookup(&self, _ip: IpAddr) -> Option<GeoInfo> {
        std::future::pending::<()>().await;
        None
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

pub fn memory_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

/// 创建临时 SQLite 数据库的存储实例
pub async fn sqlite_store() -> (Arc<dyn Store>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("linkpulse-test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let store = SeaOrmStore::connect(&db_url, "sqlite", 5)
        .await
        .expect("Failed to create storage");

    (Arc::new(store), temp_dir)
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.access_token_secret = ACCESS_SECRET.to_string();
    config.auth.refresh_token_secret = REFRESH_SECRET.to_string();
    config.auth.rate_limit_enabled = false;
    config.analytics.fallback_device = "Android".to_string();
    config.analytics.loopback_remap_ip = None;
    config
}

pub fn token_issuer() -> Arc<dyn TokenIssuer> {
    Arc::new(JwtService::new(
        ACCESS_SECRET,
        REFRESH_SECRET,
        Duration::from_secs(3600),
        Duration::from_secs(7200),
    ))
}

pub fn account_service(store: Arc<dyn Store>) -> AccountService {
    let sessions = SessionManager::new(store.clone(), token_issuer());
    AccountService::new(store, sessions)
}

pub fn url_service(store: Arc<dyn Store>, geo: Arc<dyn GeoLookup>) -> UrlService {
    UrlService::new(
        store,
        geo,
        VisitPolicy {
            fallback_device: "Android".to_string(),
            loopback_remap_ip: None,
        },
    )
}
