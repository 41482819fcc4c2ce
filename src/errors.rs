use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum AuraError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    InvalidTransition(String),
    Serialization(String),
    EmailDelivery(String),
    ExternalService(String),
}

impl AuraError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AuraError::DatabaseConfig(_) => "E001",
            AuraError::DatabaseConnection(_) => "E002",
            AuraError::DatabaseOperation(_) => "E003",
            AuraError::FileOperation(_) => "E004",
            AuraError::Validation(_) => "E005",
            AuraError::NotFound(_) => "E006",
            AuraError::Conflict(_) => "E007",
            AuraError::Unauthorized(_) => "E008",
            AuraError::Forbidden(_) => "E009",
            AuraError::InvalidTransition(_) => "E010",
            AuraError::Serialization(_) => "E011",
            AuraError::EmailDelivery(_) => "E012",
            AuraError::ExternalService(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AuraError::DatabaseConfig(_) => "Database Configuration Error",
            AuraError::DatabaseConnection(_) => "Database Connection Error",
            AuraError::DatabaseOperation(_) => "Database Operation Error",
            AuraError::FileOperation(_) => "File Operation Error",
            AuraError::Validation(_) => "Validation Error",
            AuraError::NotFound(_) => "Resource Not Found",
            AuraError::Conflict(_) => "Resource Conflict",
            AuraError::Unauthorized(_) => "Unauthorized",
            AuraError::Forbidden(_) => "Forbidden",
            AuraError::InvalidTransition(_) => "Invalid Status Transition",
            AuraError::Serialization(_) => "Serialization Error",
            AuraError::EmailDelivery(_) => "Email Delivery Error",
            AuraError::ExternalService(_) => "External Service Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AuraError::DatabaseConfig(msg)
            | AuraError::DatabaseConnection(msg)
            | AuraError::DatabaseOperation(msg)
            | AuraError::FileOperation(msg)
            | AuraError::Validation(msg)
            | AuraError::NotFound(msg)
            | AuraError::Conflict(msg)
            | AuraError::Unauthorized(msg)
            | AuraError::Forbidden(msg)
            | AuraError::InvalidTransition(msg)
            | AuraError::Serialization(msg)
            | AuraError::EmailDelivery(msg)
            | AuraError::ExternalService(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            AuraError::Validation(_) => StatusCode::BAD_REQUEST,
            AuraError::NotFound(_) => StatusCode::NOT_FOUND,
            AuraError::Conflict(_) | AuraError::InvalidTransition(_) => StatusCode::CONFLICT,
            AuraError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuraError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuraError::EmailDelivery(_) | AuraError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AuraError::DatabaseConfig(_)
            | AuraError::DatabaseConnection(_)
            | AuraError::DatabaseOperation(_)
            | AuraError::FileOperation(_)
            | AuraError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AuraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AuraError {}

// 便捷的构造函数
impl AuraError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AuraError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AuraError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AuraError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AuraError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AuraError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AuraError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        AuraError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        AuraError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        AuraError::Forbidden(msg.into())
    }

    pub fn invalid_transition<T: Into<String>>(msg: T) -> Self {
        AuraError::InvalidTransition(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        AuraError::Serialization(msg.into())
    }

    pub fn email_delivery<T: Into<String>>(msg: T) -> Self {
        AuraError::EmailDelivery(msg.into())
    }

    pub fn external_service<T: Into<String>>(msg: T) -> Self {
        AuraError::ExternalService(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AuraError {
    fn from(err: sea_orm::DbErr) -> Self {
        AuraError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AuraError {
    fn from(err: std::io::Error) -> Self {
        AuraError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AuraError {
    fn from(err: serde_json::Error) -> Self {
        AuraError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuraError>;
