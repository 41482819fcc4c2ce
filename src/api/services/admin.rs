//! 管理员 API
//!
//! 所有接口都由服务层做管理员校验，非管理员得到 403。

use std::str::FromStr;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::info;

use crate::api::middleware::CurrentUser;
use crate::services::AppServices;
use crate::services::partnership_service::{AdminAction, AdminEmailRequest};

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_response};
use super::types::{SearchQuery, SentResponse};

pub async fn admin_partnerships(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    api_result(
        services
            .partnerships
            .admin_overview(&user, query.search.as_deref())
            .await,
    )
}

pub async fn partnership_action(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (id, action) = path.into_inner();
    let Ok(action) = AdminAction::from_str(&action) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Unknown action: {}", action),
        );
    };

    info!("Admin API: {} requested {} on {}", user.email, action, id);
    api_result(services.partnerships.apply_action(&user, &id, action).await)
}

pub async fn admin_links(CurrentUser(user): CurrentUser, services: web::Data<AppServices>) -> HttpResponse {
    api_result(services.links.list_all(&user).await)
}

pub async fn send_email(
    CurrentUser(user): CurrentUser,
    services: web::Data<AppServices>,
    body: web::Json<AdminEmailRequest>,
) -> HttpResponse {
    api_result(
        services
            .partnerships
            .send_admin_email(&user, body.into_inner())
            .await
            .map(|()| SentResponse { sent: true }),
    )
}

/// 管理路由 `/admin`
pub fn admin_routes() -> actix_web::Scope {
    web::scope("/admin")
        .route("/partnerships", web::get().to(admin_partnerships))
        .route(
            "/partnerships/{id}/{action}",
            web::post().to(partnership_action),
        )
        .route("/links", web::get().to(admin_links))
        .route("/email", web::post().to(send_email))
}
