//! 会话生命周期
//!
//! Anonymous → Authenticated（signup/login）→ Authenticated（refresh）→ Revoked（logout）。
//! 每个用户只保留一个有效 refresh token：存放在 User 上的那个值。

use std::sync::Arc;

use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use super::jwt::TokenIssuer;
use crate::errors::{AppError, Result};
use crate::storage::{Store, StoreError, User};
use crate::utils::Deadline;

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn Store>,
    tokens: Arc<dyn TokenIssuer>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    /// 只签发，不落库；用于注册时随新用户一并写入
    pub fn mint(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.tokens.issue_access(&user.id, &user.full_name)?,
            refresh_token: self.tokens.issue_refresh(&user.id)?,
        })
    }

    /// 签发并覆盖用户当前的 refresh token
    pub async fn issue_tokens(&self, user: &User, deadline: Deadline) -> Result<TokenPair> {
        let pair = self.mint(user)?;
        deadline
            .bound(
                "store refresh token",
                self.store
                    .update_user_refresh_token(&user.id, Some(&pair.refresh_token), Utc::now()),
            )
            .await??;

        debug!("Tokens issued for user {}", user.id);
        Ok(pair)
    }

    /// 用 refresh token 换新的 access token，refresh token 本身不轮换
    pub async fn refresh(&self, refresh_token: &str, deadline: Deadline) -> Result<String> {
        if refresh_token.trim().is_empty() {
            return Err(AppError::invalid_refresh_token("missing refresh token"));
        }

        let claims = self.tokens.validate_refresh(refresh_token).map_err(|e| {
            debug!("Refresh token rejected: {}", e);
            AppError::invalid_refresh_token("invalid refresh token")
        })?;

        let user = deadline
            .bound("load user", self.store.find_user_by_id(&claims.sub))
            .await??
            .ok_or_else(|| AppError::invalid_refresh_token("invalid refresh token"))?;

        let matches = user
            .refresh_token
            .as_deref()
            .is_some_and(|stored| bool::from(stored.as_bytes().ct_eq(refresh_token.as_bytes())));
        if !matches {
            warn!("Stale or revoked refresh token presented for user {}", user.id);
            return Err(AppError::expired_or_revoked("expired refresh token"));
        }

        Ok(self.tokens.issue_access(&user.id, &user.full_name)?)
    }

    /// 校验 access token 并清除该用户的 refresh token
    pub async fn revoke(&self, access_token: &str, deadline: Deadline) -> Result<()> {
        let claims = self
            .tokens
            .validate_access(access_token)
            .map_err(|_| AppError::unauthorized("invalid or expired access token"))?;

        let cleared = deadline
            .bound(
                "clear refresh token",
                self.store
                    .update_user_refresh_token(&claims.sub, None, Utc::now()),
            )
            .await?;

        match cleared {
            Ok(()) => {}
            // token 签名有效但用户已不存在
            Err(StoreError::NotFound(_)) => {
                warn!("Logout for unknown user {}", claims.sub);
                return Err(AppError::unauthorized("invalid or expired access token"));
            }
            Err(e) => return Err(e.into()),
        }

        info!("User {} logged out", claims.sub);
        Ok(())
    }
}
