//! 链接 API

use actix_web::{HttpResponse, web};
use tracing::{info, trace};

use crate::api::middleware::CurrentUser;
use crate::services::{AppServices, CreateLinkRequest};

use super::helpers::{api_result, created_response, error_from_aura};
use super::types::DeletedResponse;

/// 当前用户的链接，按创建时间倒序
pub async fn list_links(CurrentUser(user): CurrentUser, services: web::Data<AppServices>) -> HttpResponse {
    trace!("API: list links for {}", user.email);
    api_result(services.links.list_mine(&user).await)
}

pub async fn create_link(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    body: web::Json<CreateLinkRequest>,
) -> HttpResponse {
    match services.links.create(&user, body.into_inner()).await {
        Ok(created) => {
            info!("API: {} created link {}", user.email, created.link.code);
            created_response(created)
        }
        Err(e) => error_from_aura(&e),
    }
}

pub async fn delete_link(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    api_result(
        services
            .links
            .delete(&user, &id)
            .await
            .map(|()| DeletedResponse { id, deleted: true }),
    )
}

pub async fn link_clicks(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> HttpResponse {
    api_result(services.links.click_breakdown(&user, &path).await)
}

/// 链接路由 `/links`
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::get().to(list_links))
        .route("", web::post().to(create_link))
        .route("/{id}/clicks", web::get().to(link_clicks))
        .route("/{id}", web::delete().to(delete_link))
}
