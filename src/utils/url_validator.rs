//! URL 规范化与验证
//!
//! 目标链接和商家网站都要经过这里：补全协议、阻止危险协议、只接受 http/https

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => {
                write!(f, "Dangerous protocol blocked: {}", proto)
            }
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 没有协议的输入补上 `https://`
///
/// `example.com/shop` → `https://example.com/shop`；已有 `scheme:` 的保持原样，
/// 交给 `validate_url` 判断。
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() || has_scheme(trimmed) {
        return trimmed.to_string();
    }
    format!("https://{}", trimmed)
}

/// 是否带 `scheme:` 前缀（`localhost:8080` 这类 host:port 不算）
fn has_scheme(input: &str) -> bool {
    let lower = input.to_lowercase();
    if lower.contains("://") {
        return true;
    }
    DANGEROUS_PROTOCOLS.iter().any(|p| lower.starts_with(p)) || lower.starts_with("mailto:")
}

/// 验证 URL 安全性
///
/// 1. 不为空
/// 2. 不是危险协议（javascript:, data:, file: 等）
/// 3. 必须是 http:// 或 https://
/// 4. 能被解析且有 host
pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url_lower = url.to_lowercase();

    for proto in DANGEROUS_PROTOCOLS {
        if url_lower.starts_with(proto) {
            return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
        }
    }

    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        let proto = url_lower
            .split(':')
            .next()
            .map(|s| format!("{}:", s))
            .unwrap_or_default();
        return Err(UrlValidationError::InvalidProtocol(proto));
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(())
}

/// 提取小写 host，去掉 `www.` 前缀；无法解析时返回 None
pub fn url_host(url: &str) -> Option<String> {
    let parsed = Url::parse(&normalize_url(url)).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}
