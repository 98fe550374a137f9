use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpResponse, Responder, web};
use rust_embed::Embed;
use tracing::{error, trace};

use crate::api::middleware::AdminPageGuard;

// 页面只是 JSON API 的简单前端，编译时嵌入
#[derive(Embed)]
#[folder = "static/"]
struct PageAssets;

pub struct PagesService;

impl PagesService {
    fn serve(name: &str) -> HttpResponse {
        match PageAssets::get(name) {
            Some(content) => {
                trace!("Serving embedded page {}", name);
                HttpResponse::Ok()
                    .insert_header((CONTENT_TYPE, "text/html; charset=utf-8"))
                    .insert_header((CACHE_CONTROL, "no-cache"))
                    .body(content.data.into_owned())
            }
            None => {
                error!("Embedded page missing: {}", name);
                HttpResponse::NotFound().finish()
            }
        }
    }

    pub async fn index() -> impl Responder {
        Self::serve("index.html")
    }

    pub async fn admin_dashboard() -> impl Responder {
        Self::serve("admin/index.html")
    }

    pub async fn admin_login() -> impl Responder {
        Self::serve("admin/login.html")
    }
}

pub fn page_routes() -> actix_web::Scope<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<actix_web::body::EitherBody<actix_web::body::BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    web::scope("/admin")
        .wrap(AdminPageGuard)
        .route("", web::get().to(PagesService::admin_dashboard))
        .route("/", web::get().to(PagesService::admin_dashboard))
        .route("/login", web::get().to(PagesService::admin_login))
}

pub fn index_routes() -> actix_web::Resource {
    web::resource("/").route(web::get().to(PagesService::index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_embedded() {
        assert!(PageAssets::get("index.html").is_some());
        assert!(PageAssets::get("admin/index.html").is_some());
        assert!(PageAssets::get("admin/login.html").is_some());
    }
}
