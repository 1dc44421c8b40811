use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户记录
///
/// `refresh_token` 为当前唯一有效的 refresh token，登出时清空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
    pub refresh_token_issued_at: Option<DateTime<Utc>>,
}

impl User {
    /// 新注册用户（尚未签发 token）
    pub fn new(full_name: String, email: String, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            email,
            password_hash,
            created_at: Utc::now(),
            refresh_token: None,
            refresh_token_issued_at: None,
        }
    }
}

/// 短链接及其访问统计
///
/// 不变量：`clicks == sum(devices) == sum(locations)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub url_id: String,
    pub user_id: String,
    pub label: String,
    pub long_url: String,
    pub short_url_key: String,
    pub no_of_clicks: u64,
    pub device: BTreeMap<String, u64>,
    pub location: BTreeMap<String, u64>,
    pub created_at: DateTime<Utc>,
}

impl ShortUrl {
    pub fn new(user_id: String, label: String, long_url: String, short_url_key: String) -> Self {
        Self {
            url_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            label,
            long_url,
            short_url_key,
            no_of_clicks: 0,
            device: BTreeMap::new(),
            location: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// 检查计数不变量
    pub fn counters_consistent(&self) -> bool {
        let devices: u64 = self.device.values().sum();
        let locations: u64 = self.location.values().sum();
        devices == self.no_of_clicks && locations == self.no_of_clicks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_short_url_is_empty() {
        let url = ShortUrl::new(
            "u1".to_string(),
            "docs".to_string(),
            "https://example.com/docs".to_string(),
            "docs".to_string(),
        );
        assert_eq!(url.no_of_clicks, 0);
        assert!(url.device.is_empty());
        assert!(url.location.is_empty());
        assert!(url.counters_consistent());
    }

    #[test]
    fn test_counters_consistent_detects_drift() {
        let mut url = ShortUrl::new(
            "u1".to_string(),
            String::new(),
            "https://example.com".to_string(),
            "k".to_string(),
        );
        url.no_of_clicks = 2;
        url.device.insert("Linux".to_string(), 2);
        url.location.insert("Berlin".to_string(), 1);
        assert!(!url.counters_consistent());

        url.location.insert("unknown".to_string(), 1);
        assert!(url.counters_consistent());
    }

    #[test]
    fn test_new_user_has_no_session() {
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "$argon2id$stub".to_string(),
        );
        assert!(user.refresh_token.is_none());
        assert!(user.refresh_token_issued_at.is_none());
        assert_eq!(user.id.len(), 36);
    }
}
