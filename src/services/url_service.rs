//! 短链接创建、列表与重定向

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info};

use super::analytics::AnalyticsAggregator;
use super::geoip::{GeoLookup, UNKNOWN_LOCATION};
use super::key_registry::KeyRegistry;
use crate::errors::{AppError, Result};
use crate::storage::{ShortUrl, Store, StoreError};
use crate::utils::Deadline;
use crate::utils::ip::remap_loopback;
use crate::utils::url_validator::validate_long_url;
use crate::utils::user_agent::device_label;

#[derive(Debug, Clone)]
pub struct CreateUrlRequest {
    pub label: String,
    pub long_url: String,
    pub short_key: String,
}

/// 访问者元数据
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

/// 设备与位置的兜底策略
#[derive(Debug, Clone)]
pub struct VisitPolicy {
    pub fallback_device: String,
    pub loopback_remap_ip: Option<IpAddr>,
}

impl From<&crate::config::AnalyticsConfig> for VisitPolicy {
    fn from(config: &crate::config::AnalyticsConfig) -> Self {
        Self {
            fallback_device: config.fallback_device.clone(),
            loopback_remap_ip: config.loopback_remap_ip,
        }
    }
}

#[derive(Clone)]
pub struct UrlService {
    store: Arc<dyn Store>,
    registry: KeyRegistry,
    analytics: AnalyticsAggregator,
    geo: Arc<dyn GeoLookup>,
    policy: VisitPolicy,
}

impl UrlService {
    pub fn new(store: Arc<dyn Store>, geo: Arc<dyn GeoLookup>, policy: VisitPolicy) -> Self {
        Self {
            registry: KeyRegistry::new(store.clone()),
            analytics: AnalyticsAggregator::new(store.clone(), policy.fallback_device.clone()),
            store,
            geo,
            policy,
        }
    }

    pub async fn create_url(
        &self,
        owner_id: &str,
        req: CreateUrlRequest,
        deadline: Deadline,
    ) -> Result<ShortUrl> {
        let long_url = validate_long_url(&req.long_url)?;
        let key = self.registry.allocate(&req.short_key, deadline).await?;

        let url = ShortUrl::new(
            owner_id.to_string(),
            req.label.trim().to_string(),
            long_url,
            key.into_inner(),
        );

        match deadline
            .bound("insert short url", self.store.insert_url(&url))
            .await?
        {
            Ok(()) => {
                info!("User {} created short key {}", owner_id, url.short_url_key);
                Ok(url)
            }
            // 并发分配同一短码时，落败的一方在这里被唯一约束拦下
            Err(StoreError::Duplicate(_)) => Err(AppError::key_taken(format!(
                "short key '{}' is already taken",
                url.short_url_key
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_urls(&self, owner_id: &str, deadline: Deadline) -> Result<Vec<ShortUrl>> {
        Ok(deadline
            .bound("list short urls", self.store.find_urls_by_owner(owner_id))
            .await??)
    }

    /// 解析短码并记录一次访问，返回更新后的短链接（含目标地址）
    ///
    /// 短码是否存在由 `AnalyticsAggregator::record_visit` 判断
    pub async fn redirect(
        &self,
        key: &str,
        visitor: Visitor,
        deadline: Deadline,
    ) -> Result<ShortUrl> {
        let device = device_label(visitor.user_agent.as_deref(), &self.policy.fallback_device);
        let location = self.locate(visitor.ip, deadline).await;

        self.analytics
            .record_visit(key, &device, &location, deadline)
            .await
    }

    /// 地理位置查询最多占用剩余预算的一半；失败或超时记为 "unknown"
    async fn locate(&self, ip: Option<IpAddr>, deadline: Deadline) -> String {
        let Some(ip) = ip else {
            return UNKNOWN_LOCATION.to_string();
        };
        let ip = remap_loopback(ip, self.policy.loopback_remap_ip);

        let geo_deadline = Deadline::after(deadline.remaining() / 2);
        match geo_deadline.bound("geoip lookup", self.geo.lookup(ip)).await {
            Ok(Some(info)) => info.location_label().to_string(),
            Ok(None) => UNKNOWN_LOCATION.to_string(),
            Err(e) => {
                debug!("GeoIP lookup for {} abandoned: {}", ip, e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}
