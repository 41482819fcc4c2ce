pub mod url_validator;

pub use url_validator::{UrlValidationError, normalize_url, url_host, validate_url};

/// 短码允许的最大长度
pub const MAX_SHORT_CODE_LEN: usize = 64;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 短码格式校验：字母数字、`_`、`-`，1..=64 个字符
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// HTML 转义，用于服务端渲染的跳转页面
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 逗号分隔的标签字符串 → 去空白、去空项
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
