use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::generate_secure_token;

/// 应用配置（从 TOML 与环境变量加载，启动后只读，显式传递）
///
/// - server: 监听地址、端口、worker 数量
/// - database: 数据库 URL、连接池、单次操作超时
/// - auth: JWT 密钥与有效期、Cookie 属性
/// - cors: 跨域来源
/// - analytics: GeoIP 与设备识别策略
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LP，分隔符：__
    /// 示例：LP__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate().map_err(config::ConfigError::Message)?;
        if Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 校验加载后的配置值
    ///
    /// 密钥为空时跳过比较，由 `AuthConfig::fill_missing_secrets` 补全
    pub fn validate(&self) -> Result<(), String> {
        if self.database.operation_timeout_ms == 0 {
            return Err("database.operation_timeout_ms must be greater than 0".to_string());
        }
        if self.auth.access_token_hours == 0 {
            return Err("auth.access_token_hours must be greater than 0".to_string());
        }
        if self.auth.refresh_token_hours == 0 {
            return Err("auth.refresh_token_hours must be greater than 0".to_string());
        }

        let access = self.auth.access_token_secret.trim();
        if !access.is_empty() && access == self.auth.refresh_token_secret.trim() {
            return Err(
                "auth.access_token_secret and auth.refresh_token_secret must differ".to_string(),
            );
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// 0 表示使用 actix 默认值（CPU 核数）
    #[serde(default)]
    pub workers: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 单次请求内存储与网络调用的总预算（毫秒）
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token_secret: String,
    #[serde(default)]
    pub refresh_token_secret: String,
    #[serde(default = "default_access_token_hours")]
    pub access_token_hours: u64,
    #[serde(default = "default_refresh_token_hours")]
    pub refresh_token_hours: u64,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default)]
    pub cookie_secure: bool,
    /// /signup 与 /login 按客户端 IP 限流
    #[serde(default = "default_rate_limit_enabled")]
    pub rate_limit_enabled: bool,
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
    #[serde(default = "default_rate_limit_seconds_per_request")]
    pub rate_limit_seconds_per_request: u64,
}

impl AuthConfig {
    /// 未配置的密钥替换为随机值（重启后已签发的 token 失效）
    pub fn fill_missing_secrets(&mut self) {
        if self.access_token_secret.trim().is_empty() {
            warn!("auth.access_token_secret is empty, using a random secret for this process");
            self.access_token_secret = generate_secure_token();
        }
        if self.refresh_token_secret.trim().is_empty() {
            warn!("auth.refresh_token_secret is empty, using a random secret for this process");
            self.refresh_token_secret = generate_secure_token();
        }
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_hours.saturating_mul(3600))
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_hours.saturating_mul(3600))
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    /// 为空时只允许同源请求，`"*"` 允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_allow_credentials")]
    pub allow_credentials: bool,
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
}

/// 访问统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// MaxMindDB 文件路径 (GeoLite2-City.mmdb)
    /// 如果配置且文件可读，使用本地解析；否则使用外部 API
    #[serde(default)]
    pub maxminddb_path: Option<String>,

    /// 外部 GeoIP API URL，`{ip}` 为占位符
    #[serde(default = "default_geoip_api_url")]
    pub geoip_api_url: String,

    /// 无法识别操作系统时使用的设备标签
    #[serde(default = "default_fallback_device")]
    pub fallback_device: String,

    /// 回环地址查询地理位置时替换成的公网地址，为空则不替换
    #[serde(default = "default_loopback_remap_ip")]
    pub loopback_remap_ip: Option<IpAddr>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://linkpulse.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_operation_timeout_ms() -> u64 {
    3000
}

fn default_access_token_hours() -> u64 {
    10
}

fn default_refresh_token_hours() -> u64 {
    72
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit_burst() -> u32 {
    5
}

fn default_rate_limit_seconds_per_request() -> u64 {
    1
}

fn default_cors_enabled() -> bool {
    true
}

fn default_cors_allow_credentials() -> bool {
    true
}

fn default_cors_max_age() -> usize {
    3600
}

fn default_geoip_api_url() -> String {
    "http://ip-api.com/json/{ip}?fields=status,country,city".to_string()
}

fn default_fallback_device() -> String {
    "Android".to_string()
}

fn default_loopback_remap_ip() -> Option<IpAddr> {
    Some(IpAddr::from([157, 51, 198, 201]))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: 0,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_hours: default_access_token_hours(),
            refresh_token_hours: default_refresh_token_hours(),
            cookie_domain: None,
            cookie_secure: false,
            rate_limit_enabled: default_rate_limit_enabled(),
            rate_limit_burst: default_rate_limit_burst(),
            rate_limit_seconds_per_request: default_rate_limit_seconds_per_request(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: Vec::new(),
            allow_credentials: default_cors_allow_credentials(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            maxminddb_path: None,
            geoip_api_url: default_geoip_api_url(),
            fallback_device: default_fallback_device(),
            loopback_remap_ip: default_loopback_remap_ip(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
