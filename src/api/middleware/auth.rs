use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    error::InternalError,
    http::{Method, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, trace};

use crate::api::constants;
use crate::api::jwt::get_jwt_service;
use crate::api::services::{ApiResponse, ErrorCode};
use crate::config::get_config;
use crate::services::Identity;

/// 认证方式标记
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    Bearer,
    Cookie,
}

/// User authentication middleware for the `/api` scope
///
/// Bearer token 优先，其次是会话 cookie；成功后把 `Identity` 放进 request extensions。
#[derive(Clone)]
pub struct UserAuth;

impl<S, B> Transform<S, ServiceRequest> for UserAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = UserAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UserAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct UserAuthMiddleware<S> {
    service: Rc<S>,
}

fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()> {
            code: ErrorCode::Unauthorized as i32,
            message: "Unauthorized: Invalid or missing token".to_string(),
            data: None,
        })
}

impl<S, B> UserAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// Handle OPTIONS requests for CORS preflight
    fn handle_options_request(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::NoContent()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .finish()
                .map_into_right_body(),
        )
    }

    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!("Authentication failed for {} - invalid or missing token", req.path());
        req.into_response(unauthorized_response().map_into_right_body())
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
    }

    fn identity_from_token(token: &str) -> Option<Identity> {
        match get_jwt_service().validate_token(token) {
            Ok(claims) => {
                let config = get_config();
                Some(Identity::new(claims.sub, claims.name, &config.auth))
            }
            Err(e) => {
                info!("Token validation failed: {}", e);
                None
            }
        }
    }

    fn authenticate(req: &ServiceRequest) -> Option<(Identity, AuthMethod)> {
        if let Some(token) = Self::extract_bearer_token(req)
            && let Some(identity) = Self::identity_from_token(&token)
        {
            return Some((identity, AuthMethod::Bearer));
        }

        let cookie_name = get_config().auth.cookie_name.clone();
        let token = req.cookie(&cookie_name).map(|c| c.value().to_string())?;
        Self::identity_from_token(&token).map(|identity| (identity, AuthMethod::Cookie))
    }

    fn is_optional_auth(req: &ServiceRequest) -> bool {
        constants::OPTIONAL_AUTH_PATHS.contains(&req.path())
    }
}

impl<S, B> Service<ServiceRequest> for UserAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            // Handle CORS preflight requests
            if req.method() == Method::OPTIONS {
                return Ok(Self::handle_options_request(req));
            }

            if let Some((identity, method)) = Self::authenticate(&req) {
                trace!("Authenticated {} via {:?}", identity.email, method);
                req.extensions_mut().insert(identity);
                req.extensions_mut().insert(method);
                let response = srv.call(req).await?.map_into_left_body();
                return Ok(response);
            }

            if Self::is_optional_auth(&req) {
                trace!("Anonymous access to {}", req.path());
                let response = srv.call(req).await?.map_into_left_body();
                return Ok(response);
            }

            Ok(Self::handle_unauthorized(req))
        })
    }
}

/// 必须登录的 handler 参数
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();
        ready(match identity {
            Some(identity) => Ok(CurrentUser(identity)),
            None => Err(InternalError::from_response("Unauthorized", unauthorized_response()).into()),
        })
    }
}

/// 可选登录的 handler 参数
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(req.extensions().get::<Identity>().cloned())))
    }
}
