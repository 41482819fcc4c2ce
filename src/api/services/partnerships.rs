//! 合作申请与商家目录 API

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::api::middleware::{CurrentUser, MaybeUser};
use crate::services::partnership_service::{AffiliateRequest, BusinessRequest};
use crate::services::{AppServices, DirectoryQuery};

use super::helpers::{api_result, created_response, error_from_aura};

/// 自己的申请 + 所有 active 合作
pub async fn list_partnerships(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
) -> HttpResponse {
    api_result(services.partnerships.visible_for(&user).await)
}

pub async fn request_affiliate(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    body: web::Json<AffiliateRequest>,
) -> HttpResponse {
    match services
        .partnerships
        .request_affiliate(&user, body.into_inner())
        .await
    {
        Ok(p) => {
            info!("API: {} requested partnership with {}", user.email, p.website);
            created_response(p)
        }
        Err(e) => error_from_aura(&e),
    }
}

/// 公开表单，登录与否都可以提交
pub async fn request_business(
    MaybeUser(user): MaybeUser,
    services: web::Data<AppServices>,
    body: web::Json<BusinessRequest>,
) -> HttpResponse {
    match services
        .partnerships
        .request_business(user.as_ref(), body.into_inner())
        .await
    {
        Ok(p) => {
            info!("API: business partnership requested for {}", p.website);
            created_response(p)
        }
        Err(e) => error_from_aura(&e),
    }
}

pub async fn directory(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    query: web::Query<DirectoryQuery>,
) -> HttpResponse {
    api_result(services.directory.list(&user, &query).await)
}

/// 合作路由 `/partnerships`
pub fn partnerships_routes() -> actix_web::Scope {
    web::scope("/partnerships")
        .route("", web::get().to(list_partnerships))
        .route("", web::post().to(request_affiliate))
        .route("/business", web::post().to(request_business))
}

/// 目录路由 `/directory`
pub fn directory_routes() -> actix_web::Scope {
    web::scope("/directory").route("", web::get().to(directory))
}
