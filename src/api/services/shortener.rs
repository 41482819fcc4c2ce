//! 外部短链服务代理

use actix_web::{HttpResponse, web};
use tracing::{info, warn};

use crate::api::middleware::CurrentUser;
use crate::services::AppServices;
use crate::services::shortener::CreateShortLinkRequest;

use super::helpers::{api_result, error_from_aura, success_response};
use super::types::ShortenerStatsRequest;

pub async fn create_short_link(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    body: web::Json<CreateShortLinkRequest>,
) -> HttpResponse {
    match services.shortener.create_short_link(body.into_inner()).await {
        Ok(link) => {
            info!("API: {} created provider link {}", user.email, link.short_url);
            success_response(link)
        }
        Err(e) => {
            warn!("API: shortener create failed for {}: {}", user.email, e);
            error_from_aura(&e)
        }
    }
}

pub async fn short_link_stats(
    CurrentUser(_user): CurrentUser,
    services: web::Data<AppServices>,
    body: web::Json<ShortenerStatsRequest>,
) -> HttpResponse {
    api_result(services.shortener.get_stats(&body.link_id).await)
}

/// 短链代理路由 `/shortener`
pub fn shortener_routes() -> actix_web::Scope {
    web::scope("/shortener")
        .route("/links", web::post().to(create_short_link))
        .route("/stats", web::post().to(short_link_stats))
}
