use std::fmt;

use actix_web::http::StatusCode;

/// 错误分类
///
/// 边界层（HTTP）只按分类决定状态码，不再对具体错误做类型判断。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Auth => "auth",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Validation(String),
    EmailTaken(String),
    KeyReserved(String),
    KeyTaken(String),
    InvalidCredentials(String),
    Unauthorized(String),
    InvalidRefreshToken(String),
    ExpiredOrRevoked(String),
    NotFound(String),
    Timeout(String),
    Storage(String),
    Internal(String),
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "E001",
            AppError::EmailTaken(_) => "E002",
            AppError::KeyReserved(_) => "E003",
            AppError::KeyTaken(_) => "E004",
            AppError::InvalidCredentials(_) => "E005",
            AppError::Unauthorized(_) => "E006",
            AppError::InvalidRefreshToken(_) => "E007",
            AppError::ExpiredOrRevoked(_) => "E008",
            AppError::NotFound(_) => "E009",
            AppError::Timeout(_) => "E010",
            AppError::Storage(_) => "E011",
            AppError::Internal(_) => "E012",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::EmailTaken(_) | AppError::KeyReserved(_) | AppError::KeyTaken(_) => {
                ErrorKind::Conflict
            }
            AppError::InvalidCredentials(_)
            | AppError::Unauthorized(_)
            | AppError::InvalidRefreshToken(_)
            | AppError::ExpiredOrRevoked(_) => ErrorKind::Auth,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Timeout(_) | AppError::Storage(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation Error",
            AppError::EmailTaken(_) => "Email Already Registered",
            AppError::KeyReserved(_) => "Short Key Reserved",
            AppError::KeyTaken(_) => "Short Key Taken",
            AppError::InvalidCredentials(_) => "Invalid Credentials",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidRefreshToken(_) => "Invalid Refresh Token",
            AppError::ExpiredOrRevoked(_) => "Refresh Token Expired Or Revoked",
            AppError::NotFound(_) => "Resource Not Found",
            AppError::Timeout(_) => "Operation Timed Out",
            AppError::Storage(_) => "Storage Error",
            AppError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::EmailTaken(msg)
            | AppError::KeyReserved(msg)
            | AppError::KeyTaken(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::Unauthorized(msg)
            | AppError::InvalidRefreshToken(msg)
            | AppError::ExpiredOrRevoked(msg)
            | AppError::NotFound(msg)
            | AppError::Timeout(msg)
            | AppError::Storage(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// 返回给调用方的消息，内部错误不暴露存储/网络细节
    pub fn public_message(&self) -> &str {
        match self.kind() {
            ErrorKind::Internal => "internal server error",
            _ => self.message(),
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AppError {}

// 便捷的构造函数
impl AppError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn email_taken<T: Into<String>>(msg: T) -> Self {
        AppError::EmailTaken(msg.into())
    }

    pub fn key_reserved<T: Into<String>>(msg: T) -> Self {
        AppError::KeyReserved(msg.into())
    }

    pub fn key_taken<T: Into<String>>(msg: T) -> Self {
        AppError::KeyTaken(msg.into())
    }

    pub fn invalid_credentials<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidCredentials(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn invalid_refresh_token<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidRefreshToken(msg.into())
    }

    pub fn expired_or_revoked<T: Into<String>>(msg: T) -> Self {
        AppError::ExpiredOrRevoked(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        AppError::Timeout(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        AppError::Storage(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<crate::storage::StoreError> for AppError {
    fn from(err: crate::storage::StoreError) -> Self {
        match err {
            crate::storage::StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            _ => AppError::Storage(err.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token signing failed: {}", err))
    }
}

impl From<crate::utils::password::PasswordError> for AppError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
