//! API 帮助函数

use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError};
use serde::Serialize;
use tracing::{debug, error};

use crate::api::constants;
use crate::config::AuthConfig;
use crate::errors::{AppError, ErrorKind};
use crate::utils::Deadline;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 单次请求的操作预算，handler 据此创建 `Deadline`
#[derive(Debug, Clone, Copy)]
pub struct OperationBudget(pub Duration);

impl OperationBudget {
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.0)
    }
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建带 cookie 的 JSON 响应
pub fn json_response_with_cookie<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
    cookie: Cookie<'static>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .cookie(cookie)
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 AppError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 内部错误只写日志，响应体中是通用消息
pub fn error_from_app(err: &AppError) -> HttpResponse {
    match err.kind() {
        ErrorKind::Internal => error!("{} [{}]", err, err.code()),
        _ => debug!("Request rejected: {} [{}]", err, err.code()),
    }
    error_response(err.http_status(), ErrorCode::from(err), err.public_message())
}

/// 请求体解析失败时返回统一信封
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("invalid request body: {}", err);
    debug!("{}", message);
    actix_web::error::InternalError::from_response(
        err,
        error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
    )
    .into()
}

/// Cookie 构建器
#[derive(Debug, Clone)]
pub struct CookieBuilder {
    secure: bool,
    domain: Option<String>,
    access_ttl: Duration,
}

impl CookieBuilder {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            secure: config.cookie_secure,
            domain: config.cookie_domain.clone(),
            access_ttl: config.access_ttl(),
        }
    }

    fn build_cookie_base(
        &self,
        value: String,
        max_age: actix_web::cookie::time::Duration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(constants::ACCESS_COOKIE_NAME, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(max_age);
        if let Some(ref domain) = self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    pub fn build_access_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            token,
            actix_web::cookie::time::Duration::seconds(
                i64::try_from(self.access_ttl.as_secs()).unwrap_or(i64::MAX),
            ),
        )
    }

    pub fn build_expired_access_cookie(&self) -> Cookie<'static> {
        self.build_cookie_base(String::new(), actix_web::cookie::time::Duration::ZERO)
    }
}

/// 依次从 `token` cookie 与 `Authorization: Bearer` 头中取 access token
pub fn extract_access_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(constants::ACCESS_COOKIE_NAME)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}
