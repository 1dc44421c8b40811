//! GeoIP Provider 抽象层
//!
//! 根据配置自动选择实现：
//! 1. 检查 maxminddb_path 是否配置且文件可读
//! 2. 可读 → MaxMindProvider
//! 3. 不可读 → ExternalApiProvider

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::AnalyticsConfig;

/// 无法定位时使用的位置标签
pub const UNKNOWN_LOCATION: &str = "unknown";

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub city: Option<String>,
}

impl GeoInfo {
    /// 统计用的位置标签：城市，其次国家，都没有时为 "unknown"
    pub fn location_label(&self) -> &str {
        self.city
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.country.as_deref().filter(|c| !c.is_empty()))
            .unwrap_or(UNKNOWN_LOCATION)
    }
}

/// GeoIP 查询 trait
///
/// 查询失败不是错误：返回 `None`，由调用方记为 "unknown"
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo>;

    /// provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一 GeoIP Provider，启动时根据配置选择实现
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoLookup>,
}

impl GeoIpProvider {
    pub fn new(config: &AnalyticsConfig) -> Self {
        let inner: Arc<dyn GeoLookup> = match config.maxminddb_path.as_deref() {
            Some(path) if !path.is_empty() => match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back to external API",
                        path, e
                    );
                    Arc::new(ExternalApiProvider::new(&config.geoip_api_url))
                }
            },
            _ => {
                debug!("GeoIP: No MaxMind database configured, using external API");
                Arc::new(ExternalApiProvider::new(&config.geoip_api_url))
            }
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }
}

#[async_trait]
impl GeoLookup for GeoIpProvider {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        self.inner.lookup(ip).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_label_prefers_city() {
        let info = GeoInfo {
            country: Some("India".to_string()),
            city: Some("Chennai".to_string()),
        };
        assert_eq!(info.location_label(), "Chennai");
    }

    #[test]
    fn test_location_label_falls_back() {
        let info = GeoInfo {
            country: Some("India".to_string()),
            city: Some(String::new()),
        };
        assert_eq!(info.location_label(), "India");
        assert_eq!(GeoInfo::default().location_label(), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_missing_maxmind_file_falls_back_to_api() {
        let config = AnalyticsConfig {
            maxminddb_path: Some("/nonexistent/GeoLite2-City.mmdb".to_string()),
            ..Default::default()
        };
        let provider = GeoIpProvider::new(&config);
        assert_eq!(provider.name(), "ExternalAPI");
    }
}
