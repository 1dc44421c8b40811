//! 注册与登录

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{SessionManager, TokenPair};
use crate::errors::{AppError, Result};
use crate::storage::{Store, StoreError, User};
use crate::utils::Deadline;
use crate::utils::password::{hash_password_blocking, verify_password_blocking};

const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 注册或登录成功后的会话
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    sessions: SessionManager,
}

/// 邮箱比较不区分大小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_signup(req: &SignupRequest) -> Result<()> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::validation("full name cannot be empty"));
    }
    let email = req.email.trim();
    let looks_like_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !looks_like_email {
        return Err(AppError::validation("a valid email is required"));
    }
    if req.password.is_empty() {
        return Err(AppError::validation("password cannot be empty"));
    }
    Ok(())
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, sessions: SessionManager) -> Self {
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// 创建用户并直接登录：新用户与其 refresh token 一次写入
    pub async fn signup(&self, req: SignupRequest, deadline: Deadline) -> Result<Session> {
        validate_signup(&req)?;
        let email = normalize_email(&req.email);

        let existing = deadline
            .bound("count users", self.store.count_users_by_email(&email))
            .await??;
        if existing > 0 {
            return Err(AppError::email_taken("email already registered"));
        }

        let password_hash = hash_password_blocking(req.password).await?;
        let mut user = User::new(req.full_name.trim().to_string(), email, password_hash);
        let tokens = self.sessions.mint(&user)?;
        user.refresh_token = Some(tokens.refresh_token.clone());
        user.refresh_token_issued_at = Some(Utc::now());

        match deadline
            .bound("insert user", self.store.insert_user(&user))
            .await?
        {
            Ok(()) => {}
            Err(StoreError::Duplicate(detail)) => {
                warn!("Concurrent signup for the same email: {}", detail);
                return Err(AppError::email_taken("email already registered"));
            }
            Err(e) => return Err(e.into()),
        }

        info!("User signed up: {}", user.id);
        Ok(Session { user, tokens })
    }

    pub async fn login(&self, req: LoginRequest, deadline: Deadline) -> Result<Session> {
        let email = normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::invalid_credentials(INVALID_CREDENTIALS));
        }

        let user = deadline
            .bound("find user", self.store.find_user_by_email(&email))
            .await??
            .ok_or_else(|| AppError::invalid_credentials(INVALID_CREDENTIALS))?;

        if !verify_password_blocking(req.password, user.password_hash.clone()).await? {
            warn!("Failed login for user {}", user.id);
            return Err(AppError::invalid_credentials(INVALID_CREDENTIALS));
        }

        let tokens = self.sessions.issue_tokens(&user, deadline).await?;
        info!("User logged in: {}", user.id);
        Ok(Session { user, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_req(email: &str) -> SignupRequest {
        SignupRequest {
            full_name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "engine".to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup(&signup_req("a@x.com")).is_ok());
        assert!(matches!(
            validate_signup(&signup_req("not-an-email")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_signup(&signup_req("@x.com")),
            Err(AppError::Validation(_))
        ));

        let mut req = signup_req("a@x.com");
        req.full_name = " ".to_string();
        assert!(matches!(validate_signup(&req), Err(AppError::Validation(_))));

        let mut req = signup_req("a@x.com");
        req.password.clear();
        assert!(matches!(validate_signup(&req), Err(AppError::Validation(_))));
    }
}
