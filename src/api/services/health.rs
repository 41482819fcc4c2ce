use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use super::{ApiResponse, ErrorCode};
use crate::storage::{SeaOrmStorage, StorageConfig};

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: StorageConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u32,
    pub storage: HealthStorageCheck,
    pub response_time_ms: u32,
}

/// Health Service
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = storage.get_backend_config();

        let storage_status = match tokio::time::timeout(Duration::from_secs(5), storage.ping()).await
        {
            Ok(Ok(())) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some(format!("database error: {}", e)),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u32;
        let is_healthy = storage_status.status == "healthy";

        let health_data = HealthResponse {
            status: storage_status.status.clone(),
            timestamp: now.to_rfc3339(),
            uptime: uptime_seconds,
            storage: storage_status,
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        let health_response = ApiResponse {
            code: if is_healthy {
                ErrorCode::Success as i32
            } else {
                ErrorCode::ServiceUnavailable as i32
            },
            message: if is_healthy {
                "OK".to_string()
            } else {
                "Service Unavailable".to_string()
            },
            data: Some(health_data),
        };

        let response_status = if is_healthy {
            actix_web::http::StatusCode::OK
        } else {
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            start_time.elapsed(),
            if is_healthy { "healthy" } else { "unhealthy" },
            uptime_seconds
        );

        HttpResponse::build(response_status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(health_response)
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
}
