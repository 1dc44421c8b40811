//! 存储层
//!
//! `Store` 是业务层看到的唯一存储接口，由 `StoreFactory::connect` 显式创建，
//! 再以 `Arc<dyn Store>` 注入到各个组件中。

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::DatabaseConfig;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStore;
pub use memory::MemoryStore;
pub use models::{ShortUrl, User};

/// 存储层错误
///
/// `Duplicate` 表示违反唯一约束，由调用方映射为具体的冲突错误；
/// `NotFound` 表示按 id 更新的目标行不存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Duplicate(String),
    NotFound(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(msg) => write!(f, "Duplicate entry: {}", msg),
            Self::NotFound(msg) => write!(f, "Record not found: {}", msg),
            Self::Backend(msg) => write!(f, "Storage backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => Self::Duplicate(detail),
            _ => Self::Backend(err.to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// 后端名称（用于日志）
    fn backend_name(&self) -> &'static str;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// 覆盖用户当前的 refresh token；`None` 表示登出。
    /// 用户不存在时返回 `StoreError::NotFound`
    async fn update_user_refresh_token(
        &self,
        user_id: &str,
        token: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn count_users_by_email(&self, email: &str) -> StoreResult<u64>;

    /// 插入短链接；短码已存在时返回 `StoreError::Duplicate`
    async fn insert_url(&self, url: &ShortUrl) -> StoreResult<()>;
    async fn count_urls_by_key(&self, key: &str) -> StoreResult<u64>;
    async fn find_urls_by_owner(&self, user_id: &str) -> StoreResult<Vec<ShortUrl>>;

    /// 原子地将 clicks、device[device] 与 location[location] 各加一，
    /// 返回更新后的记录；短码不存在时返回 `None`
    async fn increment_url_counters(
        &self,
        key: &str,
        device: &str,
        location: &str,
    ) -> StoreResult<Option<ShortUrl>>;

    /// 释放连接等资源
    async fn close(&self) -> StoreResult<()>;
}

/// 从数据库 URL 推断存储后端
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str, StoreError> {
    if database_url.starts_with("memory://") {
        Ok("memory")
    } else if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        Ok("postgres")
    } else {
        Err(StoreError::Backend(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: memory://, sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

pub struct StoreFactory;

impl StoreFactory {
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
        let backend = infer_backend_from_url(&config.database_url)?;

        let store: Arc<dyn Store> = if backend == "memory" {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(SeaOrmStore::connect(&config.database_url, backend, config.pool_size).await?)
        };

        info!("Using storage backend: {}", store.backend_name());
        Ok(store)
    }
}
