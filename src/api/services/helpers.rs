//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::AuraError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 201 Created
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 AuraError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_aura(err: &AuraError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 AuraError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<AuraError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: AuraError = e.into();
            error_from_aura(&err)
        }
    }
}

/// 会话 cookie
pub struct CookieBuilder {
    name: String,
    secure: bool,
    max_age_secs: i64,
}

impl CookieBuilder {
    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self {
            name: config.auth.cookie_name.clone(),
            secure: config.auth.cookie_secure,
            max_age_secs: config.auth.token_ttl_secs as i64,
        }
    }

    fn build_cookie_base(&self, value: String, max_age_secs: i64) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.name.clone(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(actix_web::cookie::time::Duration::seconds(max_age_secs));
        cookie
    }

    pub fn build_session_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(token, self.max_age_secs)
    }

    /// 登出时下发的过期 cookie
    pub fn build_expired_session_cookie(&self) -> Cookie<'static> {
        self.build_cookie_base(String::new(), 0)
    }
}
