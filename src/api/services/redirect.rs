use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{debug, trace};

use crate::errors::AppError;
use crate::services::{UrlService, Visitor};
use crate::utils::ip::extract_client_ip;
use crate::utils::is_valid_short_key;

use super::error_code::ErrorCode;
use super::helpers::{OperationBudget, error_from_app, json_response};

#[derive(Serialize)]
struct HomeInfo {
    service: &'static str,
    version: &'static str,
}

/// `GET /`
pub async fn home() -> HttpResponse {
    json_response(
        StatusCode::OK,
        ErrorCode::Success,
        "welcome to linkpulse",
        Some(HomeInfo {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// `GET /{key}`：记录访问后 307 跳转到目标地址
pub async fn handle_redirect(
    req: HttpRequest,
    path: web::Path<String>,
    urls: web::Data<UrlService>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    let key = path.into_inner();

    // 非法短码不访问存储
    if !is_valid_short_key(&key) {
        trace!("Invalid short key rejected: {}", key);
        return error_from_app(&AppError::not_found(format!(
            "short url '{}' not found",
            key
        )));
    }

    let visitor = Visitor {
        ip: extract_client_ip(&req),
        user_agent: req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from),
    };

    match urls.redirect(&key, visitor, budget.deadline()).await {
        Ok(url) => {
            debug!("Redirecting {} -> {}", key, url.long_url);
            HttpResponse::TemporaryRedirect()
                .insert_header(("Location", url.long_url))
                .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
                .finish()
        }
        Err(e) => error_from_app(&e),
    }
}
