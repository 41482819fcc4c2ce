use actix_web::{HttpResponse, web};

use crate::api::middleware::CurrentUser;
use crate::services::AppServices;

use super::helpers::api_result;

/// 用户、链接、可见合作和统计一次返回
pub async fn dashboard(CurrentUser(user): CurrentUser, services: web::Data<AppServices>) -> HttpResponse {
    api_result(services.dashboard.load(&user).await)
}

pub fn dashboard_routes() -> actix_web::Scope {
    web::scope("/dashboard").route("", web::get().to(dashboard))
}
