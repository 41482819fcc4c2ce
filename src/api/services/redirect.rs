use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::trace;

use crate::config::get_config;
use crate::services::redirect::NotFoundReason;
use crate::services::{ClickContext, RedirectResolver, Resolution};
use crate::storage::ShortLink;
use crate::utils::html_escape;

pub struct RedirectService {}

impl RedirectService {
    /// `/go/{code}`、`/r/{code}` 以及不带 code 的 `/go`、`/r`
    pub async fn handle_redirect(
        req: HttpRequest,
        resolver: web::Data<Arc<RedirectResolver>>,
    ) -> impl Responder {
        let code = req.match_info().get("code").map(str::to_string);
        trace!("Redirect request for {:?}", code);

        let ctx = Self::click_context(&req);
        match resolver.resolve(code.as_deref(), ctx).await {
            Resolution::Redirect(link) => Self::finish_redirect(&link),
            Resolution::NotFound(reason) => Self::not_found_response(reason),
            Resolution::Failed => Self::error_response(),
        }
    }

    fn click_context(req: &HttpRequest) -> ClickContext {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let query = req.query_string();

        ClickContext {
            query: (!query.is_empty()).then(|| query.to_string()),
            referrer: header("Referer"),
            user_agent: header("User-Agent"),
            ip_address: req
                .connection_info()
                .realip_remote_addr()
                .map(str::to_string),
        }
    }

    fn finish_redirect(link: &ShortLink) -> HttpResponse {
        let delay_ms = get_config().redirect.delay_ms;
        if delay_ms == 0 {
            return HttpResponse::TemporaryRedirect()
                .insert_header(("Location", link.destination_url.as_str()))
                .insert_header(("Cache-Control", "no-store"))
                .finish();
        }

        HttpResponse::Ok()
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body(interstitial_page(link, delay_ms))
    }

    #[inline]
    fn not_found_response(reason: NotFoundReason) -> HttpResponse {
        let message = match reason {
            NotFoundReason::MissingCode => "Invalid link",
            _ => "This link does not exist or has expired",
        };
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body(error_page("Link not found", message))
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body(error_page(
                "Something went wrong",
                "There was an error processing this link",
            ))
    }
}

/// 带延迟的跳转页：meta refresh + 脚本 + 手动链接
fn interstitial_page(link: &ShortLink, delay_ms: u64) -> String {
    let config = get_config();
    let url = html_escape(&link.destination_url);
    let brand = html_escape(&config.app.brand_name);
    let title = html_escape(link.title.as_deref().unwrap_or("your destination"));
    // JSON 字符串里的 `<` 转义，避免提前闭合 script
    let js_url = serde_json::to_string(&link.destination_url)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace('<', "\\u003c");
    let refresh_secs = delay_ms.div_ceil(1000);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<meta http-equiv="refresh" content="{refresh_secs};url={url}">
<title>Redirecting | {brand}</title>
</head>
<body>
<main>
<h1>Redirecting you to {title}</h1>
<p>If you are not redirected automatically, <a href="{url}" rel="noopener">click here</a>.</p>
</main>
<script>setTimeout(function () {{ window.location.replace({js_url}); }}, {delay_ms});</script>
</body>
</html>"#
    )
}

/// 404/500 页面，带返回仪表盘的链接
fn error_page(heading: &str, message: &str) -> String {
    let config = get_config();
    let dashboard = html_escape(&config.app.public_url(&config.app.dashboard_path));
    let brand = html_escape(&config.app.brand_name);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>{heading} | {brand}</title>
</head>
<body>
<main>
<h1>{heading}</h1>
<p>{message}</p>
<p><a href="{dashboard}">Back to dashboard</a></p>
</main>
</body>
</html>"#,
        heading = html_escape(heading),
        message = html_escape(message),
    )
}

/// Redirect 路由配置
pub fn redirect_routes(cfg: &mut web::ServiceConfig) {
    for prefix in ["/go", "/r"] {
        cfg.route(prefix, web::get().to(RedirectService::handle_redirect))
            .route(prefix, web::head().to(RedirectService::handle_redirect))
            .route(
                &format!("{}/", prefix),
                web::get().to(RedirectService::handle_redirect),
            )
            .route(
                &format!("{}/{{code}}", prefix),
                web::get().to(RedirectService::handle_redirect),
            )
            .route(
                &format!("{}/{{code}}", prefix),
                web::head().to(RedirectService::handle_redirect),
            );
    }
}
