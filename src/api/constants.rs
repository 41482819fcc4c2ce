//! API 模块常量定义

/// API 路由前缀
pub const API_PREFIX: &str = "/api";

/// 管理接口前缀（位于 API_PREFIX 之下）
pub const ADMIN_SCOPE: &str = "/admin";

/// 无需登录也可访问的 API 路径（登录时仍会解析身份）
pub const OPTIONAL_AUTH_PATHS: &[&str] = &["/api/partnerships/business"];

/// 请求体大小上限
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
