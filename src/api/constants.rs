//! API 模块常量定义

/// Access Token Cookie 名称
pub const ACCESS_COOKIE_NAME: &str = "token";

/// `GET /refresh` 读取 refresh token 的请求头
pub const REFRESH_TOKEN_HEADER: &str = "refresh-token";

/// JSON 请求体上限
pub const MAX_JSON_BODY_BYTES: usize = 64 * 1024;
