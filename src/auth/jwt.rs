use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Access Token Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// user id
    pub sub: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

/// Refresh Token Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

/// 签发与校验 token 的能力
pub trait TokenIssuer: Send + Sync {
    fn issue_access(&self, user_id: &str, name: &str)
    -> Result<String, jsonwebtoken::errors::Error>;
    fn issue_refresh(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error>;
    fn validate_access(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error>;
    fn validate_refresh(&self, token: &str)
    -> Result<RefreshClaims, jsonwebtoken::errors::Error>;
}

/// HS256 JWT，access 与 refresh 使用不同的密钥
pub struct JwtService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// 密钥须已由 `AuthConfig::fill_missing_secrets` 补全
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.access_token_secret,
            &config.refresh_token_secret,
            config.access_ttl(),
            config.refresh_ttl(),
        )
    }

    fn window(ttl: Duration) -> (i64, i64) {
        let now = Utc::now().timestamp();
        (now, now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)))
    }

    fn invalid_token() -> jsonwebtoken::errors::Error {
        jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidToken)
    }
}

impl TokenIssuer for JwtService {
    fn issue_access(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let (iat, exp) = Self::window(self.access_ttl);
        let claims = AccessClaims {
            sub: user_id.to_string(),
            name: name.to_string(),
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        encode(&Header::default(), &claims, &self.access_encoding)
    }

    fn issue_refresh(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let (iat, exp) = Self::window(self.refresh_ttl);
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
    }

    fn validate_access(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let token_data =
            decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(Self::invalid_token());
        }
        Ok(token_data.claims)
    }

    fn validate_refresh(
        &self,
        token: &str,
    ) -> Result<RefreshClaims, jsonwebtoken::errors::Error> {
        let token_data =
            decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())?;

        if token_data.claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(Self::invalid_token());
        }
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "access_secret_key_32_bytes_long!";
    const REFRESH_SECRET: &str = "refresh_secret_key_32_bytes_lng!";

    fn create_test_service() -> JwtService {
        JwtService::new(
            ACCESS_SECRET,
            REFRESH_SECRET,
            Duration::from_secs(10 * 3600),
            Duration::from_secs(72 * 3600),
        )
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let service = create_test_service();
        let token = service.issue_access("user-1", "Ada").unwrap();
        let claims = service.validate_access(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, 10 * 3600);
    }

    #[test]
    fn test_issue_and_validate_refresh_token() {
        let service = create_test_service();
        let token = service.issue_refresh("user-1").unwrap();
        let claims = service.validate_refresh(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.token_type, REFRESH_TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_tokens_minted_together_differ() {
        let service = create_test_service();
        let a = service.issue_refresh("user-1").unwrap();
        let b = service.issue_refresh("user-1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let access_token = service.issue_access("user-1", "Ada").unwrap();
        assert!(service.validate_refresh(&access_token).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = create_test_service();
        let refresh_token = service.issue_refresh("user-1").unwrap();
        assert!(service.validate_access(&refresh_token).is_err());
    }

    #[test]
    fn test_same_secret_still_checks_token_type() {
        let service = JwtService::new(
            ACCESS_SECRET,
            ACCESS_SECRET,
            Duration::from_secs(60),
            Duration::from_secs(60),
        );
        let refresh_token = service.issue_refresh("user-1").unwrap();
        assert!(service.validate_access(&refresh_token).is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate_access("invalid.token.here").is_err());
        assert!(service.validate_refresh("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = JwtService::new(
            "different_secret_key_32_bytes!!!",
            REFRESH_SECRET,
            Duration::from_secs(60),
            Duration::from_secs(60),
        );

        let token = service1.issue_access("user-1", "Ada").unwrap();
        assert!(service2.validate_access(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        // 过期时间须超过默认 leeway
        let now = Utc::now();
        let claims = AccessClaims {
            sub: "user-1".to_string(),
            name: "Ada".to_string(),
            iat: (now - chrono::Duration::hours(2)).timestamp(),
            exp: (now - chrono::Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        let result = service.validate_access(&token);
        assert!(
            result.is_err(),
            "Expected expired token to be rejected, but got: {:?}",
            result
        );
    }
}
