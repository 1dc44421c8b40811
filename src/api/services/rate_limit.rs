//! /signup 与 /login 的限流
//!
//! 令牌桶状态保存在 `GovernorConfig` 内部，配置只构建一次，
//! 所有 worker 共享同一个限流器。

use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError,
};
use actix_web::dev::ServiceRequest;
use actix_web::middleware::Condition;
use governor::middleware::NoOpMiddleware;
use tracing::{debug, info};

use crate::config::AuthConfig;

/// 基于连接 IP 的限流 key 提取器
///
/// 只使用 TCP peer address，不信任 X-Forwarded-For；取不到时归入同一个桶
#[derive(Clone, Copy, Debug)]
pub struct ClientKeyExtractor;

impl KeyExtractor for ClientKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let key = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        debug!("Login rate limit key: {}", key);
        Ok(key)
    }
}

#[derive(Clone)]
pub struct LoginRateLimit {
    enabled: bool,
    config: GovernorConfig<ClientKeyExtractor, NoOpMiddleware>,
}

impl LoginRateLimit {
    pub fn from_config(config: &AuthConfig) -> Self {
        let seconds = config.rate_limit_seconds_per_request.max(1);
        let burst = config.rate_limit_burst.max(1);
        let governor_config = GovernorConfigBuilder::default()
            .seconds_per_request(seconds)
            .burst_size(burst)
            .key_extractor(ClientKeyExtractor)
            .finish()
            .expect("period and burst are clamped to at least 1");

        if config.rate_limit_enabled {
            info!("Login rate limiter: 1 req per {}s, burst {}", seconds, burst);
        } else {
            info!("Login rate limiter disabled");
        }

        Self {
            enabled: config.rate_limit_enabled,
            config: governor_config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 路由级中间件；关闭时直接透传
    pub fn middleware(&self) -> Condition<Governor<ClientKeyExtractor, NoOpMiddleware>> {
        Condition::new(self.enabled, Governor::new(&self.config))
    }
}
