//! 响应构建帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use serde_json::json;
use tracing::error;

use crate::errors::ReviewHubError;
use crate::services::ValidationErrors;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// 纯文本响应
pub fn text_response(status: StatusCode, body: &'static str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, TEXT_PLAIN))
        .body(body)
}

/// `{"ok":true}`
pub fn ok_response() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// `400 {"error":"ValidationError","issues":{...}}`
pub fn validation_response(issues: &ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": "ValidationError",
        "issues": issues,
    }))
}

/// 存储层错误：`{"error":"DBError","message":...}`
pub fn error_from_reviewhub(err: &ReviewHubError) -> HttpResponse {
    error!("{}", err);
    HttpResponse::build(err.http_status()).json(json!({
        "error": err.api_tag(),
        "message": err.message(),
    }))
}

/// 写接口使用 UUID 作为主键
pub fn is_valid_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}
