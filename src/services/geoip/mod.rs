//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能，支持：
//! - MaxMind GeoLite2 本地数据库
//! - 外部 HTTP API (ip-api.com)

mod external_api;
mod maxmind;
mod provider;

pub use external_api::{ExternalApiProvider, parse_geo_response};
pub use maxmind::MaxMindProvider;
pub use provider::{GeoInfo, GeoIpProvider, GeoLookup, UNKNOWN_LOCATION};
