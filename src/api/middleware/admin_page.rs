//! 后台页面守卫
//!
//! `/admin/*`（登录页除外）没有有效会话时 302 到登录页，
//! 并用 `next` 记录原始路径。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::LOCATION,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::debug;

use crate::api::constants::{ADMIN_LOGIN_PATH, ADMIN_PAGE_PREFIX};
use crate::api::session::{get_session_service, has_valid_session};

#[derive(Clone, Default)]
pub struct AdminPageGuard;

impl<S, B> Transform<S, ServiceRequest> for AdminPageGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminPageGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminPageGuardMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminPageGuardMiddleware<S> {
    service: Rc<S>,
}

/// 路径是否受守卫保护
pub fn is_guarded_path(path: &str) -> bool {
    let in_admin = path == ADMIN_PAGE_PREFIX
        || path
            .strip_prefix(ADMIN_PAGE_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'));
    in_admin && !path.starts_with(ADMIN_LOGIN_PATH)
}

/// 登录页跳转地址
pub fn login_redirect_location(path: &str) -> String {
    format!("{}?next={}", ADMIN_LOGIN_PATH, urlencoding::encode(path))
}

impl<S, B> Service<ServiceRequest> for AdminPageGuardMiddleware<S>
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
            let path = req.path().to_string();
            if is_guarded_path(&path) && !has_valid_session(req.request(), get_session_service())
            {
                debug!("Admin page {} requires login", path);
                return Ok(req.into_response(
                    HttpResponse::Found()
                        .insert_header((LOCATION, login_redirect_location(&path)))
                        .finish()
                        .map_into_right_body(),
                ));
            }

            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
