//! API 类型定义

use serde::{Deserialize, Serialize};

/// 统一 JSON 响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ShortenerStatsRequest {
    #[serde(alias = "linkId")]
    pub link_id: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct SentResponse {
    pub sent: bool,
}
