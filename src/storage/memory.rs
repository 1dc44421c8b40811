//! 内存存储后端（`memory://`）
//!
//! 短链接以 short key 为键存放在 `DashMap` 中：`entry` 保证短码唯一，
//! `get_mut` 持有分片写锁，保证一次访问的多个计数同时生效。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;

use super::{ShortUrl, Store, StoreError, StoreResult, User};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<String, User>,
    /// email -> user id
    email_index: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<UserTable>,
    urls: DashMap<String, ShortUrl>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut table = self.users.write();
        if table.email_index.contains_key(&user.email) {
            return Err(StoreError::Duplicate(format!("users.email: {}", user.email)));
        }
        if table.by_id.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("users.id: {}", user.id)));
        }
        table
            .email_index
            .insert(user.email.clone(), user.id.clone());
        table.by_id.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let table = self.users.read();
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().by_id.get(user_id).cloned())
    }

    async fn update_user_refresh_token(
        &self,
        user_id: &str,
        token: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut table = self.users.write();
        match table.by_id.get_mut(user_id) {
            Some(user) => {
                user.refresh_token = token.map(str::to_string);
                user.refresh_token_issued_at = Some(issued_at);
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("user {}", user_id))),
        }
    }

    async fn count_users_by_email(&self, email: &str) -> StoreResult<u64> {
        Ok(u64::from(self.users.read().email_index.contains_key(email)))
    }

    async fn insert_url(&self, url: &ShortUrl) -> StoreResult<()> {
        match self.urls.entry(url.short_url_key.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!(
                "short_urls.short_key: {}",
                url.short_url_key
            ))),
            Entry::Vacant(slot) => {
                slot.insert(url.clone());
                Ok(())
            }
        }
    }

    async fn count_urls_by_key(&self, key: &str) -> StoreResult<u64> {
        Ok(u64::from(self.urls.contains_key(key)))
    }

    async fn find_urls_by_owner(&self, user_id: &str) -> StoreResult<Vec<ShortUrl>> {
        let mut urls: Vec<ShortUrl> = self
            .urls
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        urls.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(urls)
    }

    async fn increment_url_counters(
        &self,
        key: &str,
        device: &str,
        location: &str,
    ) -> StoreResult<Option<ShortUrl>> {
        let Some(mut url) = self.urls.get_mut(key) else {
            return Ok(None);
        };
        url.no_of_clicks += 1;
        *url.device.entry(device.to_string()).or_insert(0) += 1;
        *url.location.entry(location.to_string()).or_insert(0) += 1;
        Ok(Some(url.clone()))
    }

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
