use std::sync::Arc;

use tracing::debug;

use super::jwt::TokenIssuer;
use crate::errors::{AppError, Result};

/// 通过认证的调用方，只存在于请求扩展中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub name: String,
}

/// 无状态校验 access token，不访问存储
#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<dyn TokenIssuer>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { tokens }
    }

    pub fn authenticate(&self, presented: Option<&str>) -> Result<AuthenticatedUser> {
        let token = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("missing access token"))?;

        let claims = self.tokens.validate_access(token).map_err(|e| {
            debug!("Access token rejected: {}", e);
            AppError::unauthorized("invalid or expired access token")
        })?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            name: claims.name,
        })
    }
}
