//! 管理员登录 / 登出

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use governor::middleware::NoOpMiddleware;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::session::get_session_service;
use crate::config::get_config;
use crate::utils::password::verify_admin_password;

use super::helpers::{ok_response, text_response};

/// 登录限流按连接 IP 计数
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))
    }
}

/// 登录限流器：每秒补充 1 个令牌，突发 5 次，超限返回 429
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// 取出 `{"password": "..."}`；读不出来时按空密码处理
fn submitted_password(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("password").and_then(Value::as_str).map(String::from))
        .unwrap_or_default()
}

pub struct AuthService;

impl AuthService {
    /// POST /api/admin/login
    pub async fn login(body: web::Bytes) -> impl Responder {
        let config = get_config();
        let auth = &config.auth;

        if auth.admin_password.is_empty() {
            warn!("Login attempted but auth.admin_password is not configured");
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "ADMIN_PASSWORD not set");
        }

        let password = submitted_password(&body);
        match verify_admin_password(&password, &auth.admin_password) {
            Ok(true) => {}
            Ok(false) => {
                info!("Admin login failed: invalid password");
                return text_response(StatusCode::UNAUTHORIZED, "Invalid password");
            }
            Err(e) => {
                error!("Configured admin password hash is unusable: {}", e);
                return text_response(StatusCode::UNAUTHORIZED, "Invalid password");
            }
        }

        let sessions = get_session_service();
        let token = match sessions.issue() {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to issue admin session: {}", e);
                return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session");
            }
        };

        info!("Admin login successful");
        let mut resp = ok_response();
        if let Err(e) = resp.add_cookie(&sessions.session_cookie(token, auth.cookie_secure)) {
            error!("Failed to set session cookie: {}", e);
        }
        resp
    }

    /// POST /api/admin/logout
    pub async fn logout() -> impl Responder {
        let secure = get_config().auth.cookie_secure;
        info!("Admin logout");
        HttpResponse::Ok()
            .cookie(get_session_service().expired_cookie(secure))
            .json(serde_json::json!({ "ok": true }))
    }
}

pub fn auth_routes() -> actix_web::Scope {
    web::scope("/api/admin")
        .route(
            "/login",
            web::post()
                .to(AuthService::login)
                .wrap(login_rate_limiter()),
        )
        .route("/logout", web::post().to(AuthService::logout))
}
