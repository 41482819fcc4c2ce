//! 当前用户 API

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::api::middleware::CurrentUser;
use crate::services::AppServices;
use crate::storage::backend::ProfilePatch;

use super::helpers::{CookieBuilder, api_result, success_response};
use super::types::SentResponse;

pub async fn me(CurrentUser(user): CurrentUser, services: web::Data<AppServices>) -> HttpResponse {
    api_result(services.users.me(&user).await)
}

pub async fn update_me(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    body: web::Json<ProfilePatch>,
) -> HttpResponse {
    api_result(services.users.update_my_user_data(&user, &body).await)
}

/// 清除会话 cookie；Bearer token 由客户端自行丢弃
pub async fn logout(CurrentUser(user): CurrentUser) -> HttpResponse {
    info!("API: {} logged out", user.email);
    let mut response = success_response(SentResponse { sent: true });
    let cookie = CookieBuilder::from_config().build_expired_session_cookie();
    if let Err(e) = response.add_cookie(&cookie) {
        tracing::warn!("Failed to attach logout cookie: {}", e);
    }
    response
}

/// 认证路由 `/auth`
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/me", web::get().to(me))
        .route("/me", web::patch().to(update_me))
        .route("/logout", web::post().to(logout))
}
