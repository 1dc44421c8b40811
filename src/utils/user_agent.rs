//! User-Agent 解析
//!
//! 设备标签取 woothee 识别出的操作系统名称

use woothee::parser::Parser;

const UNKNOWN: &str = "UNKNOWN";

/// 返回操作系统名称；无法识别时使用 `fallback`
pub fn device_label(user_agent: Option<&str>, fallback: &str) -> String {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return fallback.to_string();
    };

    match Parser::new().parse(ua) {
        Some(result) if !result.os.is_empty() && result.os != UNKNOWN => result.os.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_os() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(device_label(Some(ua), "Android"), "Windows 10");
    }

    #[test]
    fn test_mobile_os() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        assert_eq!(device_label(Some(ua), "Android"), "iPhone");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(device_label(None, "Android"), "Android");
        assert_eq!(device_label(Some("   "), "Android"), "Android");
        assert_eq!(device_label(Some("curl-but-not-really/0"), "Android"), "Android");
    }
}
