//! 客户端 IP 处理
//!
//! 取 actix `realip_remote_addr`（支持 Forwarded / X-Forwarded-For），去掉端口。
//! 回环地址在查询地理位置前替换为配置的公网地址。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::dev::ConnectionInfo;
use tracing::debug;

/// 解析 `ip`、`ip:port`、`[v6]:port` 三种形式
pub fn parse_ip_lenient(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    if let Ok(socket_addr) = raw.parse::<SocketAddr>() {
        return Some(socket_addr.ip());
    }
    raw.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .ok()
}

pub fn client_ip_from_conn_info(conn_info: &ConnectionInfo) -> Option<IpAddr> {
    let raw = conn_info.realip_remote_addr()?;
    let ip = parse_ip_lenient(raw);
    if ip.is_none() {
        debug!("Unparseable client address: {}", raw);
    }
    ip
}

pub fn extract_client_ip(req: &HttpRequest) -> Option<IpAddr> {
    client_ip_from_conn_info(&req.connection_info())
}

/// 回环地址替换为 `remap`，其它地址原样返回
pub fn remap_loopback(ip: IpAddr, remap: Option<IpAddr>) -> IpAddr {
    match remap {
        Some(public) if ip.is_loopback() => public,
        _ => ip,
    }
}
