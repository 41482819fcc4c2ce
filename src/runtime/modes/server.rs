//! Server mode
//!
//! Configures and starts the HTTP server with all routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::constants::{API_PREFIX, MAX_PAYLOAD_BYTES};
use crate::api::middleware::UserAuth;
use crate::api::services::{AppStartTime, configure_api, health_routes, redirect_routes};
use crate::config::CorsConfig;
use crate::runtime::lifetime;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors_config.allow_credentials {
        tracing::error!(
            "SECURITY WARNING: allow_any_origin + allow_credentials is a dangerous combination! \
            Disabling credentials."
        );
    }
}

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // 未启用时保持同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "HEAD", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_header("Content-Type")
        .allowed_header("Authorization")
        .allowed_header("Accept")
        .max_age(3600);

    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    // any_origin + credentials 不允许
    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let storage = startup.storage.clone();
    let services = startup.services.clone();
    let resolver = services.resolver.clone();

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(services.clone()))
            .app_data(web::Data::new(resolver.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
            .app_data(web::JsonConfig::default().limit(MAX_PAYLOAD_BYTES))
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .service(health_routes())
            .service(
                web::scope(API_PREFIX)
                    .wrap(UserAuth)
                    .configure(configure_api),
            )
            .configure(redirect_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
