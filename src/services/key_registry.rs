//! 短码分配
//!
//! 校验顺序：格式 → 保留字 → 唯一性。唯一性最终由存储层的唯一约束保证，
//! 这里的检查只用于尽早给出 `KeyTaken`。

use std::sync::Arc;

use tracing::debug;

use crate::errors::{AppError, Result};
use crate::storage::Store;
use crate::utils::{Deadline, MAX_SHORT_KEY_LEN, is_valid_short_key};

/// 与服务路由同名的短码，不能分配
pub const RESERVED_KEYS: &[&str] = &[
    "signup",
    "login",
    "refresh",
    "logout",
    "create-url",
    "get-all-urls",
];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// 通过校验、尚未落库的短码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedKey(String);

impl AcceptedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Clone)]
pub struct KeyRegistry {
    store: Arc<dyn Store>,
}

impl KeyRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// 校验请求的短码；不重试，不推荐替代短码
    pub async fn allocate(&self, requested: &str, deadline: Deadline) -> Result<AcceptedKey> {
        let key = requested.trim();
        check_format(key)?;

        if is_reserved(key) {
            return Err(AppError::key_reserved(format!(
                "short key '{}' is reserved",
                key
            )));
        }

        if self.exists(key, deadline).await? {
            debug!("Short key already taken: {}", key);
            return Err(AppError::key_taken(format!(
                "short key '{}' is already taken",
                key
            )));
        }

        Ok(AcceptedKey(key.to_string()))
    }

    pub async fn exists(&self, key: &str, deadline: Deadline) -> Result<bool> {
        let count = deadline
            .bound("count short urls", self.store.count_urls_by_key(key))
            .await??;
        Ok(count > 0)
    }
}

fn check_format(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(AppError::validation("short key cannot be empty"));
    }
    if key.len() > MAX_SHORT_KEY_LEN {
        return Err(AppError::validation(format!(
            "short key must be at most {} characters",
            MAX_SHORT_KEY_LEN
        )));
    }
    if !is_valid_short_key(key) {
        return Err(AppError::validation(
            "short key may only contain letters, digits, '-', '_' and '.'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, ShortUrl};

    fn registry() -> (KeyRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (KeyRegistry::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_allocate_free_key() {
        let (registry, _) = registry();
        let key = registry.allocate(" promo ", Deadline::default()).await.unwrap();
        assert_eq!(key.as_str(), "promo");
    }

    #[tokio::test]
    async fn test_every_reserved_key_rejected() {
        let (registry, _) = registry();
        for reserved in RESERVED_KEYS {
            let err = registry
                .allocate(reserved, Deadline::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::KeyReserved(_)), "{}", reserved);
        }
    }

    #[tokio::test]
    async fn test_taken_key_rejected() {
        let (registry, store) = registry();
        store
            .insert_url(&ShortUrl::new(
                "u".to_string(),
                String::new(),
                "https://example.com".to_string(),
                "promo".to_string(),
            ))
            .await
            .unwrap();

        let err = registry
            .allocate("promo", Deadline::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::KeyTaken(_)));
        assert!(registry.exists("promo", Deadline::default()).await.unwrap());
        assert!(!registry.exists("other", Deadline::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_keys_rejected() {
        let (registry, _) = registry();
        for bad in ["", "   ", "a b", "../etc", "ключ"] {
            let err = registry.allocate(bad, Deadline::default()).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{:?}", bad);
        }
        let too_long = "k".repeat(MAX_SHORT_KEY_LEN + 1);
        assert!(matches!(
            registry.allocate(&too_long, Deadline::default()).await,
            Err(AppError::Validation(_))
        ));
    }
}
