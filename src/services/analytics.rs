//! 访问统计
//!
//! 一次访问对应存储层的一次原子自增：clicks、device 桶、location 桶同时加一，
//! 因此任何时刻都满足 `clicks == sum(device) == sum(location)`。

use std::sync::Arc;

use tracing::trace;

use super::key_registry::KeyRegistry;
use crate::errors::{AppError, Result};
use crate::services::geoip::UNKNOWN_LOCATION;
use crate::storage::{ShortUrl, Store};
use crate::utils::Deadline;

#[derive(Clone)]
pub struct AnalyticsAggregator {
    store: Arc<dyn Store>,
    registry: KeyRegistry,
    fallback_device: String,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn Store>, fallback_device: impl Into<String>) -> Self {
        Self {
            registry: KeyRegistry::new(store.clone()),
            store,
            fallback_device: fallback_device.into(),
        }
    }

    /// 记录一次访问，返回更新后的短链接
    pub async fn record_visit(
        &self,
        key: &str,
        device_label: &str,
        location_label: &str,
        deadline: Deadline,
    ) -> Result<ShortUrl> {
        if !self.registry.exists(key, deadline).await? {
            return Err(not_found(key));
        }

        let device = non_empty_or(device_label, &self.fallback_device);
        let location = non_empty_or(location_label, UNKNOWN_LOCATION);

        let updated = deadline
            .bound(
                "increment url counters",
                self.store.increment_url_counters(key, device, location),
            )
            .await??
            .ok_or_else(|| not_found(key))?;

        trace!(
            "Visit on {}: clicks={} device={} location={}",
            key, updated.no_of_clicks, device, location
        );
        Ok(updated)
    }
}

fn non_empty_or<'a>(label: &'a str, fallback: &'a str) -> &'a str {
    let label = label.trim();
    if label.is_empty() { fallback } else { label }
}

fn not_found(key: &str) -> AppError {
    AppError::not_found(format!("short url '{}' not found", key))
}
