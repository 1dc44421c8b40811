//! 账户与会话端点：/signup /login /refresh /logout

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::api::constants;
use crate::errors::AppError;
use crate::services::AccountService;

use super::error_code::ErrorCode;
use super::helpers::{
    CookieBuilder, OperationBudget, error_from_app, extract_access_token,
    json_response_with_cookie,
};
use super::types::{AuthSuccessResponse, LoginBody, MessageResponse, SignupBody};

/// 注册并登录，成功时返回 201 并设置 access cookie
pub async fn signup(
    body: web::Json<SignupBody>,
    accounts: web::Data<AccountService>,
    cookies: web::Data<CookieBuilder>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    match accounts
        .signup(body.into_inner().into(), budget.deadline())
        .await
    {
        Ok(session) => json_response_with_cookie(
            StatusCode::CREATED,
            ErrorCode::Success,
            "signup successful",
            Some(AuthSuccessResponse::from(session.clone())),
            cookies.build_access_cookie(session.tokens.access_token),
        ),
        Err(e) => error_from_app(&e),
    }
}

pub async fn login(
    body: web::Json<LoginBody>,
    accounts: web::Data<AccountService>,
    cookies: web::Data<CookieBuilder>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    match accounts
        .login(body.into_inner().into(), budget.deadline())
        .await
    {
        Ok(session) => json_response_with_cookie(
            StatusCode::OK,
            ErrorCode::Success,
            "login successful",
            Some(AuthSuccessResponse::from(session.clone())),
            cookies.build_access_cookie(session.tokens.access_token),
        ),
        Err(e) => error_from_app(&e),
    }
}

/// 用 `refresh-token` 请求头换新的 access token（写入 cookie）
pub async fn refresh(
    req: HttpRequest,
    accounts: web::Data<AccountService>,
    cookies: web::Data<CookieBuilder>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    let presented = req
        .headers()
        .get(constants::REFRESH_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    match accounts
        .sessions()
        .refresh(presented, budget.deadline())
        .await
    {
        Ok(access_token) => json_response_with_cookie(
            StatusCode::OK,
            ErrorCode::Success,
            "token refreshed",
            Some(MessageResponse {
                message: "access token refreshed".to_string(),
            }),
            cookies.build_access_cookie(access_token),
        ),
        Err(e) => error_from_app(&e),
    }
}

/// 受保护：清除服务端 refresh token 与客户端 cookie
pub async fn logout(
    req: HttpRequest,
    accounts: web::Data<AccountService>,
    cookies: web::Data<CookieBuilder>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    let Some(token) = extract_access_token(&req) else {
        return error_from_app(&AppError::unauthorized("missing access token"));
    };

    match accounts.sessions().revoke(&token, budget.deadline()).await {
        Ok(()) => json_response_with_cookie::<()>(
            StatusCode::OK,
            ErrorCode::Success,
            "logout successful",
            None,
            cookies.build_expired_access_cookie(),
        ),
        Err(e) => error_from_app(&e),
    }
}
