pub mod deadline;
pub mod ip;
pub mod password;
pub mod url_validator;
pub mod user_agent;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

pub use deadline::Deadline;

/// 短码最大长度
pub const MAX_SHORT_KEY_LEN: usize = 64;

/// 生成 32 字节随机值的 URL-safe base64 字符串（用作签名密钥）
pub fn generate_secure_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// 短码只允许 ASCII 字母、数字与 `-` `_` `.`
pub fn is_valid_short_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_SHORT_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token() {
        let a = generate_secure_token();
        let b = generate_secure_token();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_valid_short_key() {
        assert!(is_valid_short_key("promo"));
        assert!(is_valid_short_key("spring-sale_2025.v2"));
        assert!(is_valid_short_key(&"a".repeat(MAX_SHORT_KEY_LEN)));

        assert!(!is_valid_short_key(""));
        assert!(!is_valid_short_key(&"a".repeat(MAX_SHORT_KEY_LEN + 1)));
        assert!(!is_valid_short_key("has space"));
        assert!(!is_valid_short_key("a/b"));
        assert!(!is_valid_short_key("ünï"));
    }
}
