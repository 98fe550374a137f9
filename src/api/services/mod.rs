pub mod auth;
pub mod go;
pub mod health;
pub mod helpers;
pub mod pages;
pub mod reviews;

use actix_web::web;

pub use auth::{AuthService, LoginKeyExtractor, auth_routes, login_rate_limiter};
pub use go::{GoService, go_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use pages::{PagesService, index_routes, page_routes};
pub use reviews::{ReviewsService, review_routes};

/// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(go_routes())
        .service(review_routes())
        .service(auth_routes())
        .service(page_routes())
        .service(index_routes());
}
