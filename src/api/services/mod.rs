pub mod admin;
pub mod dashboard;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod links;
pub mod partnerships;
pub mod redirect;
pub mod shortener;
pub mod types;
pub mod users;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use types::ApiResponse;

use actix_web::web;

/// `/api` 下的全部路由；调用方负责包上 `UserAuth`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(admin::admin_routes())
        .service(users::auth_routes())
        .service(dashboard::dashboard_routes())
        .service(links::links_routes())
        .service(partnerships::partnerships_routes())
        .service(partnerships::directory_routes())
        .service(shortener::shortener_routes());
}
