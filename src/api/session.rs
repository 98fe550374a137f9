//! 管理员会话
//!
//! 登录成功后签发 JWT，放在 `admin_session` Cookie 中。
//! 写接口同时接受有效会话或 `Authorization: Bearer <admin_token>`。

use std::sync::OnceLock;

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{trace, warn};

use crate::api::constants::ADMIN_SESSION_COOKIE;
use crate::config::AuthConfig;

/// Global cached SessionService instance
static SESSION_SERVICE: OnceLock<SessionService> = OnceLock::new();

pub fn get_session_service() -> &'static SessionService {
    SESSION_SERVICE.get_or_init(|| SessionService::from_config(&crate::config::get_config().auth))
}

const SESSION_SUBJECT: &str = "admin";

/// Session Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_hours: u64,
}

impl SessionService {
    pub fn new(secret: &str, session_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_hours: session_hours.max(1),
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        let secret = if auth.jwt_secret.is_empty() {
            // 重启后旧会话全部失效
            warn!("auth.jwt_secret not configured, generating a random one for this process");
            crate::utils::generate_secure_token(32)
        } else {
            auth.jwt_secret.clone()
        };
        Self::new(&secret, auth.session_hours)
    }

    pub fn issue(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: SESSION_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.session_hours as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;
        if data.claims.sub != SESSION_SUBJECT {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
        }
        Ok(data.claims)
    }

    /// 登录成功后下发的 Cookie
    pub fn session_cookie(&self, token: String, secure: bool) -> Cookie<'static> {
        build_cookie(
            token,
            secure,
            CookieDuration::hours(self.session_hours as i64),
        )
    }

    /// 登出时下发的过期 Cookie
    pub fn expired_cookie(&self, secure: bool) -> Cookie<'static> {
        build_cookie(String::new(), secure, CookieDuration::ZERO)
    }
}

fn build_cookie(value: String, secure: bool, max_age: CookieDuration) -> Cookie<'static> {
    let mut cookie = Cookie::new(ADMIN_SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(max_age);
    cookie
}

/// 请求是否带有有效的会话 Cookie
pub fn has_valid_session(req: &HttpRequest, service: &SessionService) -> bool {
    let Some(cookie) = req.cookie(ADMIN_SESSION_COOKIE) else {
        return false;
    };
    match service.validate(cookie.value()) {
        Ok(_) => true,
        Err(e) => {
            trace!("admin session rejected: {}", e);
            false
        }
    }
}

/// Bearer token 与配置的 admin_token 常量时间比较；未配置时总是 false
pub fn has_valid_bearer(req: &HttpRequest, admin_token: &str) -> bool {
    if admin_token.is_empty() {
        return false;
    }

    let Some(token) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .and_then(|s| s.strip_prefix("Bearer "))
    else {
        return false;
    };

    token.as_bytes().ct_eq(admin_token.as_bytes()).into()
}

/// 会话 Cookie 或 Bearer token 任一有效
pub fn is_admin_request(req: &HttpRequest) -> bool {
    let config = crate::config::get_config();
    has_valid_bearer(req, &config.auth.admin_token) || has_valid_session(req, get_session_service())
}
