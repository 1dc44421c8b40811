//! 组件装配
//!
//! 存储、会话、业务服务在这里显式创建一次，再作为 app data 注册到每个 worker。

use std::sync::Arc;

use actix_web::web;
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::configure_routes;
use crate::api::constants::MAX_JSON_BODY_BYTES;
use crate::api::services::helpers::json_error_handler;
use crate::api::services::{CookieBuilder, LoginRateLimit, OperationBudget};
use crate::auth::{AuthGuard, JwtService, SessionManager, TokenIssuer};
use crate::config::AppConfig;
use crate::services::{AccountService, GeoIpProvider, GeoLookup, UrlService, VisitPolicy};
use crate::storage::{Store, StoreFactory};

#[derive(Clone)]
pub struct StartupContext {
    pub store: Arc<dyn Store>,
    accounts: web::Data<AccountService>,
    urls: web::Data<UrlService>,
    guard: web::Data<AuthGuard>,
    cookies: web::Data<CookieBuilder>,
    budget: web::Data<OperationBudget>,
    rate_limit: LoginRateLimit,
}

impl StartupContext {
    /// 用已建立的存储与地理位置查询组装所有服务
    pub fn from_parts(store: Arc<dyn Store>, geo: Arc<dyn GeoLookup>, config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtService::from_config(&config.auth));
        let sessions = SessionManager::new(store.clone(), tokens.clone());

        let accounts = AccountService::new(store.clone(), sessions);
        let urls = UrlService::new(
            store.clone(),
            geo,
            VisitPolicy::from(&config.analytics),
        );

        Self {
            store,
            accounts: web::Data::new(accounts),
            urls: web::Data::new(urls),
            guard: web::Data::new(AuthGuard::new(tokens)),
            cookies: web::Data::new(CookieBuilder::from_config(&config.auth)),
            budget: web::Data::new(OperationBudget(config.database.operation_timeout())),
            rate_limit: LoginRateLimit::from_config(&config.auth),
        }
    }

    /// 注册 app data 与路由，供 `App::configure` 使用
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.accounts.clone())
            .app_data(self.urls.clone())
            .app_data(self.guard.clone())
            .app_data(self.cookies.clone())
            .app_data(self.budget.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(MAX_JSON_BODY_BYTES)
                    .error_handler(json_error_handler),
            );
        configure_routes(cfg, &self.rate_limit);
    }
}

/// 准备服务器启动的上下文：连接存储（含迁移）、初始化 GeoIP、装配服务
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let store = StoreFactory::connect(&config.database)
        .await
        .context("Failed to create storage backend")?;

    let geo: Arc<dyn GeoLookup> = Arc::new(GeoIpProvider::new(&config.analytics));
    info!("GeoIP provider: {}", geo.name());

    let context = StartupContext::from_parts(store, geo, config);

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
