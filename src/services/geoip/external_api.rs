//! 外部 GeoIP API 实现（如 ip-api.com）
//!
//! 内置 moka 缓存，同一 IP 的并发查询只发一次 HTTP 请求

use std::net::IpAddr;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::{trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoLookup};

/// GeoIP 缓存 TTL（15 分钟）
const GEOIP_CACHE_TTL_SECS: u64 = 15 * 60;
const GEOIP_CACHE_MAX_CAPACITY: u64 = 10_000;
/// HTTP 请求超时，低于单次操作预算
const HTTP_TIMEOUT_SECS: u64 = 2;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

/// 解析 API 响应
///
/// ip-api.com 成功时返回 `{"status":"success","country":"India","city":"Chennai"}`，
/// 失败时返回 `{"status":"fail",...}`
pub fn parse_geo_response(json: &Value) -> Option<GeoInfo> {
    if json["status"].as_str() == Some("fail") {
        return None;
    }

    let country = json["country"]
        .as_str()
        .or_else(|| json["country_name"].as_str())
        .or_else(|| json["countryCode"].as_str())
        .filter(|s| !s.is_empty())
        .map(String::from);
    let city = json["city"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from);

    if country.is_none() && city.is_none() {
        return None;
    }
    Some(GeoInfo { country, city })
}

pub struct ExternalApiProvider {
    api_url_template: String,
    /// IP → GeoInfo 缓存（`None` 也缓存，避免反复查询失败的地址）
    cache: Cache<IpAddr, Option<GeoInfo>>,
}

impl ExternalApiProvider {
    /// `api_url_template` 使用 `{ip}` 作为占位符
    pub fn new(api_url_template: &str) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(GEOIP_CACHE_TTL_SECS))
            .max_capacity(GEOIP_CACHE_MAX_CAPACITY)
            .build();

        Self {
            api_url_template: api_url_template.to_string(),
            cache,
        }
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn fetch_from_api_sync(url: String) -> Option<GeoInfo> {
        let resp = match get_agent().get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("GeoIP API request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let json: Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("GeoIP API response from \"{}\" parse failed: {}", url, e);
                return None;
            }
        };

        let info = parse_geo_response(&json);
        trace!("External API lookup {}: {:?}", url, info);
        info
    }

    async fn fetch_from_api(&self, ip: IpAddr) -> Option<GeoInfo> {
        let url = self.api_url_template.replace("{ip}", &ip.to_string());

        tokio::task::spawn_blocking(move || Self::fetch_from_api_sync(url))
            .await
            .unwrap_or_else(|e| {
                warn!("GeoIP spawn_blocking failed: {}", e);
                None
            })
    }
}

#[async_trait]
impl GeoLookup for ExternalApiProvider {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        self.cache
            .get_with(ip, async {
                trace!("GeoIP cache miss for {}, fetching from API", ip);
                self.fetch_from_api(ip).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}
