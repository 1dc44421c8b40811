//! API 类型定义

use serde::{Deserialize, Serialize};

use crate::services::{CreateUrlRequest, LoginRequest, Session, SignupRequest};

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SignupBody {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl From<SignupBody> for SignupRequest {
    fn from(body: SignupBody) -> Self {
        Self {
            full_name: body.full_name,
            email: body.email,
            password: body.password,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        Self {
            email: body.email,
            password: body.password,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct CreateUrlBody {
    #[serde(default)]
    pub label: String,
    pub long_url: String,
    pub short_url_key: String,
}

impl From<CreateUrlBody> for CreateUrlRequest {
    fn from(body: CreateUrlBody) -> Self {
        Self {
            label: body.label,
            long_url: body.long_url,
            short_key: body.short_url_key,
        }
    }
}

/// signup / login 成功后的响应数据
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AuthSuccessResponse {
    pub user_id: String,
    pub full_name: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<Session> for AuthSuccessResponse {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user.id,
            full_name: session.user.full_name,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreatedUrlResponse {
    pub url_id: String,
    pub short_url_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageResponse {
    pub message: String,
}
