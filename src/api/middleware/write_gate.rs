//! 写接口守卫
//!
//! POST / PUT / DELETE 需要有效的管理员会话或 Bearer token，否则返回 401。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header::CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::api::session::is_admin_request;

#[derive(Clone, Default)]
pub struct WriteGate;

impl<S, B> Transform<S, ServiceRequest> for WriteGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = WriteGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WriteGateMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct WriteGateMiddleware<S> {
    service: Rc<S>,
}

fn is_write_method(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

impl<S, B> WriteGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!(
            "Write rejected: {} {} without admin credentials",
            req.method(),
            req.path()
        );
        req.into_response(
            HttpResponse::Unauthorized()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body("Unauthorized")
                .map_into_right_body(),
        )
    }
}

impl<S, B> Service<ServiceRequest> for WriteGateMiddleware<S>
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
            if is_write_method(req.method()) && !is_admin_request(req.request()) {
                return Ok(Self::handle_unauthorized(req));
            }

            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
