//! SeaORM storage backend
//!
//! Users, short URLs and the per-device / per-location visit buckets live in
//! SQLite, MySQL/MariaDB or PostgreSQL, with the schema managed by the
//! `migration` crate.

mod connection;
mod converters;
mod mutations;
mod query;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use super::{ShortUrl, Store, StoreError, StoreResult, User};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// SeaORM-based store
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: &'static str,
}

impl SeaOrmStore {
    /// `backend_name` 为 `infer_backend_from_url` 的结果
    pub async fn connect(
        database_url: &str,
        backend_name: &'static str,
        pool_size: u32,
    ) -> StoreResult<Self> {
        if database_url.is_empty() {
            return Err(StoreError::Backend("database url is empty".to_string()));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, pool_size).await?
        };

        run_migrations(&db).await?;

        warn!("{} Storage initialized.", backend_name.to_uppercase());
        Ok(Self { db, backend_name })
    }
}

#[async_trait]
impl Store for SeaOrmStore {
    fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.insert_user_row(user).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.load_user_by_email(email).await
    }

    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.load_user_by_id(user_id).await
    }

    async fn update_user_refresh_token(
        &self,
        user_id: &str,
        token: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.set_refresh_token(user_id, token, issued_at).await
    }

    async fn count_users_by_email(&self, email: &str) -> StoreResult<u64> {
        self.count_users_with_email(email).await
    }

    async fn insert_url(&self, url: &ShortUrl) -> StoreResult<()> {
        self.insert_url_row(url).await
    }

    async fn count_urls_by_key(&self, key: &str) -> StoreResult<u64> {
        self.count_urls_with_key(key).await
    }

    async fn find_urls_by_owner(&self, user_id: &str) -> StoreResult<Vec<ShortUrl>> {
        self.load_urls_by_owner(user_id).await
    }

    async fn increment_url_counters(
        &self,
        key: &str,
        device: &str,
        location: &str,
    ) -> StoreResult<Option<ShortUrl>> {
        self.record_hit(key, device, location).await
    }

    async fn close(&self) -> StoreResult<()> {
        self.db.clone().close().await?;
        warn!("{} Storage closed.", self.backend_name.to_uppercase());
        Ok(())
    }
}
