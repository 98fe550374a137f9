//! 评测写入参数的解析与校验
//!
//! 先做宽松的预处理（补全媒体地址、补 https://、规范化 TikTok 链接、
//! `rating: ""` 视为未填），再逐字段校验。所有字段的错误一起收集后返回。

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::tiktok;
use crate::config::MediaConfig;
use crate::storage::{NewReview, Platform, ReviewPatch};

/// `{"formErrors": [...], "fieldErrors": {"field": [...]}}`
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    fn form(&mut self, msg: impl Into<String>) {
        self.form_errors.push(msg.into());
    }

    fn field(&mut self, field: &str, msg: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(msg.into());
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, msgs) in &self.field_errors {
            parts.push(format!("{}: {}", field, msgs.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

const PLATFORM_MESSAGE: &str = "Invalid enum value. Expected 'tiktok' | 'youtube' | 'reels'";
const RATING_MESSAGE: &str = "rating must be 0..5";
const DATE_MESSAGE: &str = "publishedAt must be a valid date";

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `/xxx.jpg` → `{media_base}/xxx.jpg`
pub fn absolutize_media(value: &str, media_base: &str) -> String {
    if value.is_empty() || has_http_scheme(value) || !value.starts_with('/') {
        return value.to_string();
    }
    format!("{}{}", media_base.trim_end_matches('/'), value)
}

/// 缺少 scheme 时补 `https://`
pub fn absolutize_http(value: &str) -> String {
    if value.is_empty() || has_http_scheme(value) {
        return value.to_string();
    }
    format!("https://{}", value.trim_start_matches('/'))
}

/// 解析 `publishedAt`：RFC 3339、`YYYY-MM-DD`、无时区的日期时间（按 UTC）、毫秒时间戳
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(ms)
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.and_utc())
        }
        _ => None,
    }
}

/// 预处理：只改动存在且为字符串的字段
fn coerce(obj: &mut Map<String, Value>, media: &MediaConfig) {
    for key in ["productImage", "productGif"] {
        if let Some(Value::String(s)) = obj.get_mut(key) {
            *s = absolutize_media(s, &media.base_url);
        }
    }

    if let Some(Value::String(s)) = obj.get_mut("reviewUrl") {
        let absolute = absolutize_http(s);
        *s = tiktok::normalize_review_url(&absolute).unwrap_or(absolute);
    }

    if matches!(obj.get("rating"), Some(Value::String(s)) if s.is_empty()) {
        obj.remove("rating");
    }
}

/// 逐字段读取；`None` 表示未提供
struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            errors: ValidationErrors::default(),
        }
    }

    /// null 与缺省等价
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn require<T>(&mut self, key: &str, v: Option<T>, provided: bool) -> Option<T> {
        if v.is_none() && !provided {
            self.errors.field(key, "Required");
        }
        v
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.present(key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.errors
                    .field(key, format!("Expected string, received {}", type_name(other)));
                None
            }
        }
    }

    fn non_empty_string(&mut self, key: &str) -> Option<String> {
        let s = self.string(key)?;
        if s.is_empty() {
            self.errors
                .field(key, "String must contain at least 1 character(s)");
            return None;
        }
        Some(s)
    }

    fn platform(&mut self, key: &str) -> Option<Platform> {
        let s = self.string(key)?;
        match Platform::from_str(&s) {
            Ok(p) => Some(p),
            Err(_) => {
                self.errors
                    .field(key, format!("{}, received '{}'", PLATFORM_MESSAGE, s));
                None
            }
        }
    }

    /// `""` 视为未填
    fn optional_url(&mut self, key: &str) -> Option<String> {
        let s = self.string(key)?;
        if s.is_empty() {
            return None;
        }
        self.url_value(key, s)
    }

    fn url(&mut self, key: &str) -> Option<String> {
        let s = self.string(key)?;
        self.url_value(key, s)
    }

    /// 只接受 http/https 绝对地址
    fn url_value(&mut self, key: &str, s: String) -> Option<String> {
        let is_web_url = Url::parse(&s).is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
        if is_web_url {
            Some(s)
        } else {
            self.errors.field(key, "Invalid url");
            None
        }
    }

    fn rating(&mut self, key: &str) -> Option<f64> {
        let value = match self.present(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => {
                self.errors.field(
                    key,
                    format!("Expected number | string, received {}", type_name(other)),
                );
                return None;
            }
        };

        match value {
            Some(r) if r.is_finite() && (0.0..=5.0).contains(&r) => Some(r),
            _ => {
                self.errors.field(key, RATING_MESSAGE);
                None
            }
        }
    }

    fn string_list(&mut self, key: &str) -> Option<Vec<String>> {
        match self.present(key)? {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        other => {
                            self.errors.field(
                                key,
                                format!("Expected string, received {}", type_name(other)),
                            );
                            return None;
                        }
                    }
                }
                Some(out)
            }
            other => {
                self.errors
                    .field(key, format!("Expected array, received {}", type_name(other)));
                None
            }
        }
    }

    fn date(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let value = self.present(key)?;
        match parse_date(value) {
            Some(d) => Some(d),
            None => {
                self.errors.field(key, DATE_MESSAGE);
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn as_object(raw: &mut Value) -> Result<&mut Map<String, Value>, ValidationErrors> {
    let kind = type_name(raw);
    match raw {
        Value::Object(obj) => Ok(obj),
        _ => {
            let mut errors = ValidationErrors::default();
            errors.form(format!("Expected object, received {}", kind));
            Err(errors)
        }
    }
}

/// 解析新建请求体
pub fn parse_new_review(mut raw: Value, media: &MediaConfig) -> Result<NewReview, ValidationErrors> {
    let obj = as_object(&mut raw)?;
    coerce(obj, media);

    let mut r = FieldReader::new(obj);

    let title = r.non_empty_string("title");
    let title = r.require("title", title, r.present("title").is_some());
    let platform = r.platform("platform");
    let platform = r.require("platform", platform, r.present("platform").is_some());
    let product_image = r.optional_url("productImage");
    let product_gif = r.optional_url("productGif");
    let price = r.string("price");
    let rating = r.rating("rating");
    let tags = r.string_list("tags").unwrap_or_default();
    let aliases = r.string_list("aliases").unwrap_or_default();
    let published_at = r.date("publishedAt");
    let published_at = r.require("publishedAt", published_at, r.present("publishedAt").is_some());
    let review_url = r.url("reviewUrl");
    let review_url = r.require("reviewUrl", review_url, r.present("reviewUrl").is_some());
    let affiliate_url = r.string("affiliateUrl").unwrap_or_default();
    let pros = r.string_list("pros").unwrap_or_default();
    let cons = r.string_list("cons").unwrap_or_default();

    match (title, platform, published_at, review_url) {
        (Some(title), Some(platform), Some(published_at), Some(review_url)) => r.finish(NewReview {
            title,
            platform,
            product_image,
            product_gif,
            price,
            rating,
            tags,
            aliases,
            published_at,
            review_url,
            affiliate_url,
            pros,
            cons,
        }),
        // 必填字段缺失时 errors 一定非空
        _ => Err(r.errors),
    }
}

/// 解析部分更新请求体，所有字段可选
pub fn parse_review_patch(mut raw: Value, media: &MediaConfig) -> Result<ReviewPatch, ValidationErrors> {
    let obj = as_object(&mut raw)?;
    coerce(obj, media);

    let mut r = FieldReader::new(obj);

    let patch = ReviewPatch {
        title: r.non_empty_string("title"),
        platform: r.platform("platform"),
        product_image: r.optional_url("productImage"),
        product_gif: r.optional_url("productGif"),
        price: r.string("price"),
        rating: r.rating("rating"),
        tags: r.string_list("tags"),
        aliases: r.string_list("aliases"),
        published_at: r.date("publishedAt"),
        review_url: r.url("reviewUrl"),
        affiliate_url: r.string("affiliateUrl"),
        pros: r.string_list("pros"),
        cons: r.string_list("cons"),
    };

    r.finish(patch)
}
