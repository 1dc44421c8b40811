//! 长链接验证
//!
//! 重定向目标只接受 http:// 与 https://

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "long url cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "unsupported scheme '{}', long url must start with http:// or https://",
                proto
            ),
            Self::InvalidFormat(msg) => write!(f, "invalid long url: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 校验并返回去除首尾空白后的长链接
pub fn validate_long_url(raw: &str) -> Result<String, UrlValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(other.to_string())),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(trimmed.to_string())
}

impl From<UrlValidationError> for crate::errors::AppError {
    fn from(err: UrlValidationError) -> Self {
        crate::errors::AppError::validation(err.to_string())
    }
}
