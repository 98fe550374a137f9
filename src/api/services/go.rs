//! `GET /go?u=...` 出站跳转

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::api::constants::CACHE_NO_STORE;
use crate::services::{LinkResolver, Resolution, interstitial};

pub struct GoService;

/// 取出查询串中第一个 `u`（表单解码一次，剩余的编码交给 resolver）
fn target_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "u")
        .map(|(_, v)| v.into_owned())
}

impl GoService {
    pub async fn handle_go(req: HttpRequest, resolver: web::Data<LinkResolver>) -> impl Responder {
        let target = target_param(req.query_string());
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let resolution = resolver.resolve(target.as_deref(), user_agent);

        match resolution {
            Resolution::Interstitial(page) => {
                trace!("Serving interstitial for {}", page.coupon_url);
                HttpResponse::Ok()
                    .insert_header((CONTENT_TYPE, "text/html; charset=utf-8"))
                    .insert_header((CACHE_CONTROL, CACHE_NO_STORE))
                    .body(interstitial::render(&page))
            }
            Resolution::Redirect(location) => Self::redirect(&location),
            Resolution::Home(reason) => {
                debug!("Go target rejected ({}), redirecting home", reason);
                Self::redirect("/")
            }
        }
    }

    fn redirect(location: &str) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((LOCATION, location))
            .insert_header((CACHE_CONTROL, CACHE_NO_STORE))
            .finish()
    }
}

pub fn go_routes() -> actix_web::Resource {
    web::resource("/go").route(web::get().to(GoService::handle_go))
}
