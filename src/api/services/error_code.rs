//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::AuraError;

/// API 错误码枚举
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 链接错误
/// - 4000-4099: 合作错误
/// - 5000-5099: 外部服务错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenExpired = 2001,
    TokenInvalid = 2002,
    AdminRequired = 2003,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkInvalidCode = 3003,

    // 合作错误 4000-4099
    PartnershipNotFound = 4000,
    PartnershipInvalidTransition = 4001,
    PartnershipInvalidRequest = 4002,

    // 外部服务错误 5000-5099
    EmailDeliveryFailed = 5000,
    ShortenerFailed = 5001,
    ShortenerUnavailable = 5002,
}

impl From<&AuraError> for ErrorCode {
    fn from(err: &AuraError) -> Self {
        match err {
            AuraError::Validation(_) => ErrorCode::BadRequest,
            AuraError::NotFound(_) => ErrorCode::NotFound,
            AuraError::Conflict(_) => ErrorCode::Conflict,
            AuraError::Unauthorized(_) => ErrorCode::Unauthorized,
            AuraError::Forbidden(_) => ErrorCode::Forbidden,
            AuraError::InvalidTransition(_) => ErrorCode::PartnershipInvalidTransition,
            AuraError::EmailDelivery(_) => ErrorCode::EmailDeliveryFailed,
            AuraError::ExternalService(_) => ErrorCode::ShortenerFailed,
            AuraError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            AuraError::DatabaseConfig(_)
            | AuraError::DatabaseOperation(_)
            | AuraError::FileOperation(_)
            | AuraError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
