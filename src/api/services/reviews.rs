//! `/api/reviews` 目录接口

use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::http::header::CACHE_CONTROL;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::{Value, json};
use tracing::debug;

use crate::api::middleware::WriteGate;
use crate::config::get_config;
use crate::services::{OEmbedClient, SearchQuery, parse_new_review, parse_review_patch, search};
use crate::storage::StorageProvider;

use super::helpers::{
    error_from_reviewhub, is_valid_id, ok_response, text_response, validation_response,
};

pub struct ReviewsService;

/// 每个键只保留第一次出现的值
fn query_params(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    params
}

fn parse_json_body(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

impl ReviewsService {
    /// GET /api/reviews
    pub async fn list_reviews(
        req: HttpRequest,
        storage: web::Data<StorageProvider>,
        oembed: web::Data<OEmbedClient>,
    ) -> impl Responder {
        let params = query_params(req.query_string());
        let query = SearchQuery::from_params(
            params.get("q").map(String::as_str),
            params.get("tags").map(String::as_str),
            params.get("limit").map(String::as_str),
            params.get("tiktokUrl").map(String::as_str),
        );
        debug!("Review search: {:?}", query);

        let storage = match storage.get().await {
            Ok(s) => s,
            Err(e) => return error_from_reviewhub(&e),
        };

        match search::search(&storage, &oembed, &query).await {
            Ok(outcome) => HttpResponse::Ok()
                .insert_header((CACHE_CONTROL, outcome.cache.header_value()))
                .json(json!({ "data": outcome.data })),
            Err(e) => error_from_reviewhub(&e),
        }
    }

    /// POST /api/reviews
    pub async fn create_review(
        body: web::Bytes,
        storage: web::Data<StorageProvider>,
    ) -> impl Responder {
        let Some(raw) = parse_json_body(&body) else {
            return text_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
        };

        let input = match parse_new_review(raw, &get_config().media) {
            Ok(input) => input,
            Err(issues) => {
                debug!("Review rejected: {}", issues);
                return validation_response(&issues);
            }
        };

        let storage = match storage.get().await {
            Ok(s) => s,
            Err(e) => return error_from_reviewhub(&e),
        };

        match storage.insert(input).await {
            Ok(review) => HttpResponse::Created().json(json!({ "data": { "id": review.id } })),
            Err(e) => error_from_reviewhub(&e),
        }
    }

    /// PUT /api/reviews/{id}
    pub async fn update_review(
        path: web::Path<String>,
        body: web::Bytes,
        storage: web::Data<StorageProvider>,
    ) -> impl Responder {
        let id = path.into_inner();
        if !is_valid_id(&id) {
            return text_response(StatusCode::BAD_REQUEST, "Invalid id");
        }

        let Some(raw) = parse_json_body(&body) else {
            return text_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
        };

        let patch = match parse_review_patch(raw, &get_config().media) {
            Ok(patch) => patch,
            Err(issues) => {
                debug!("Review update rejected: {}", issues);
                return validation_response(&issues);
            }
        };

        let storage = match storage.get().await {
            Ok(s) => s,
            Err(e) => return error_from_reviewhub(&e),
        };

        // 没有匹配的记录同样返回 ok
        match storage.update(&id, patch).await {
            Ok(matched) => {
                debug!("Update {} matched: {}", id, matched);
                ok_response()
            }
            Err(e) => error_from_reviewhub(&e),
        }
    }

    /// DELETE /api/reviews/{id}
    pub async fn delete_review(
        path: web::Path<String>,
        storage: web::Data<StorageProvider>,
    ) -> impl Responder {
        let id = path.into_inner();
        if !is_valid_id(&id) {
            return text_response(StatusCode::BAD_REQUEST, "Invalid id");
        }

        let storage = match storage.get().await {
            Ok(s) => s,
            Err(e) => return error_from_reviewhub(&e),
        };

        match storage.delete(&id).await {
            Ok(deleted) => {
                debug!("Delete {} matched: {}", id, deleted);
                ok_response()
            }
            Err(e) => error_from_reviewhub(&e),
        }
    }
}

pub fn review_routes() -> actix_web::Scope<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<actix_web::body::EitherBody<actix_web::body::BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    web::scope("/api/reviews")
        .wrap(WriteGate)
        .route("", web::get().to(ReviewsService::list_reviews))
        .route("", web::post().to(ReviewsService::create_review))
        .route("/{id}", web::put().to(ReviewsService::update_review))
        .route("/{id}", web::delete().to(ReviewsService::delete_review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_keeps_first() {
        let params = query_params("q=%20lip%20&tags=a,b&tags=c&tiktokUrl=%22x%22");
        assert_eq!(params.get("q").map(String::as_str), Some(" lip "));
        assert_eq!(params.get("tags").map(String::as_str), Some("a,b"));
        assert_eq!(params.get("tiktokUrl").map(String::as_str), Some("\"x\""));
        assert!(!params.contains_key("limit"));
    }

    #[test]
    fn test_parse_json_body() {
        assert!(parse_json_body(b"{\"a\":1}").is_some());
        assert!(parse_json_body(b"[]").is_some());
        assert!(parse_json_body(b"{oops").is_none());
        assert!(parse_json_body(b"").is_none());
    }
}
