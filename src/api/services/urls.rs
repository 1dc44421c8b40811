//! 短链接管理端点（受保护）

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use crate::auth::AuthenticatedUser;
use crate::services::UrlService;

use super::error_code::ErrorCode;
use super::helpers::{OperationBudget, error_from_app, json_response, success_response};
use super::types::{CreateUrlBody, CreatedUrlResponse};

pub async fn create_url(
    user: web::ReqData<AuthenticatedUser>,
    body: web::Json<CreateUrlBody>,
    urls: web::Data<UrlService>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    match urls
        .create_url(&user.user_id, body.into_inner().into(), budget.deadline())
        .await
    {
        Ok(url) => json_response(
            StatusCode::CREATED,
            ErrorCode::Success,
            "short url created",
            Some(CreatedUrlResponse {
                url_id: url.url_id,
                short_url_key: url.short_url_key,
            }),
        ),
        Err(e) => error_from_app(&e),
    }
}

/// 当前用户的全部短链接（含统计），按创建时间排序
pub async fn get_all_urls(
    user: web::ReqData<AuthenticatedUser>,
    urls: web::Data<UrlService>,
    budget: web::Data<OperationBudget>,
) -> HttpResponse {
    match urls.list_urls(&user.user_id, budget.deadline()).await {
        Ok(list) => success_response(list),
        Err(e) => error_from_app(&e),
    }
}
