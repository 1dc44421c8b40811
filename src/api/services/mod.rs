pub mod account;
pub mod error_code;
pub mod helpers;
pub mod rate_limit;
pub mod redirect;
pub mod types;
pub mod urls;

use actix_web::web;

use crate::api::middleware::RequireAuth;

pub use error_code::ErrorCode;
pub use helpers::{CookieBuilder, OperationBudget};
pub use rate_limit::LoginRateLimit;
pub use types::ApiResponse;

/// 注册全部路由
///
/// - POST /signup, POST /login（限流）
/// - GET /refresh
/// - GET /logout, POST /create-url, GET /get-all-urls（需认证）
/// - GET / 首页
/// - GET /{key} 重定向并计数（通配，必须最后注册；只有 GET 算一次访问）
pub fn configure_routes(cfg: &mut web::ServiceConfig, rate_limit: &LoginRateLimit) {
    cfg.route("/", web::get().to(redirect::home))
        .route(
            "/signup",
            web::post()
                .to(account::signup)
                .wrap(rate_limit.middleware()),
        )
        .route(
            "/login",
            web::post()
                .to(account::login)
                .wrap(rate_limit.middleware()),
        )
        .route("/refresh", web::get().to(account::refresh))
        .route("/logout", web::get().to(account::logout).wrap(RequireAuth))
        .route(
            "/create-url",
            web::post().to(urls::create_url).wrap(RequireAuth),
        )
        .route(
            "/get-all-urls",
            web::get().to(urls::get_all_urls).wrap(RequireAuth),
        )
        .route("/{key}", web::get().to(redirect::handle_redirect));
}
