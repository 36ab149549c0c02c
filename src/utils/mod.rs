use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::render::MountPrefix;

pub fn parse_listen_addr(value: &str) -> Result<SocketAddr, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("address is empty".to_string());
    }
    raw.parse::<SocketAddr>()
        .map_err(|_| "expected HOST:PORT with an IP host".to_string())
}

pub fn parse_http_url(value: &str) -> Result<reqwest::Url, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("url is empty".to_string());
    }
    let url = reqwest::Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}', expected http or https")),
    }
}

pub fn parse_header_name(value: &str) -> Result<HeaderName, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("header name is empty".to_string());
    }
    HeaderName::from_bytes(raw.to_ascii_lowercase().as_bytes())
        .map_err(|_| "not a valid HTTP header name".to_string())
}

pub fn parse_base_path(value: &str) -> Result<MountPrefix, String> {
    let raw = value.trim();
    if !raw.starts_with('/') {
        return Err("base path must start with '/'".to_string());
    }
    MountPrefix::parse(raw).ok_or_else(|| "base path must be a plain URL path".to_string())
}
