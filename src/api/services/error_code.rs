//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::AppError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证与账户错误
/// - 3000-3099: 短链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    Timeout = 1006,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenExpired = 2001,
    TokenInvalid = 2002,
    RateLimitExceeded = 2004,
    EmailTaken = 2010,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkDatabaseError = 3005,
    LinkKeyReserved = 3007,
}

impl From<&AppError> for ErrorCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Validation(_) => ErrorCode::BadRequest,
            AppError::EmailTaken(_) => ErrorCode::EmailTaken,
            AppError::KeyReserved(_) => ErrorCode::LinkKeyReserved,
            AppError::KeyTaken(_) => ErrorCode::LinkAlreadyExists,
            AppError::InvalidCredentials(_) => ErrorCode::AuthFailed,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::InvalidRefreshToken(_) => ErrorCode::TokenInvalid,
            AppError::ExpiredOrRevoked(_) => ErrorCode::TokenExpired,
            AppError::NotFound(_) => ErrorCode::LinkNotFound,
            AppError::Timeout(_) => ErrorCode::Timeout,
            AppError::Storage(_) => ErrorCode::LinkDatabaseError,
            AppError::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}
