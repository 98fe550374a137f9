//! 目录搜索
//!
//! - 普通搜索：`q` + `tags`
//! - TikTok 链接查找：按规范化后的 reviewUrl 精确匹配
//! - 目录中没有且没有其他条件时，用 oEmbed 拼一条临时记录

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use tracing::debug;
use url::Url;

use super::oembed::OEmbedClient;
use super::tiktok;
use crate::errors::Result;
use crate::storage::{Platform, Review, ReviewFilter, SeaOrmStorage};

pub const DEFAULT_LIMIT: u64 = 36;
pub const MAX_LIMIT: u64 = 100;

const OEMBED_DEFAULT_TITLE: &str = "TikTok Video";

/// 响应缓存策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// 有结果
    Normal,
    /// 空结果，缓存时间更短
    Short,
}

impl CachePolicy {
    pub fn header_value(self) -> &'static str {
        match self {
            CachePolicy::Normal => "public, max-age=30, stale-while-revalidate=60",
            CachePolicy::Short => "public, max-age=15",
        }
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub data: Vec<Review>,
    pub cache: CachePolicy,
}

/// 规范化后的查询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub tags: Vec<String>,
    pub limit: u64,
    pub tiktok_url: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: None,
            tags: Vec::new(),
            limit: DEFAULT_LIMIT,
            tiktok_url: None,
        }
    }
}

impl SearchQuery {
    pub fn from_params(
        q: Option<&str>,
        tags: Option<&str>,
        limit: Option<&str>,
        tiktok_url: Option<&str>,
    ) -> Self {
        let q = q.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

        let tags = tags
            .unwrap_or_default()
            .split(',')
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        let tiktok_url = tiktok_url
            .map(strip_quotes)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Self {
            q,
            tags,
            limit: parse_limit(limit),
            tiktok_url,
        }
    }

    fn filter(&self, review_url: Option<String>) -> ReviewFilter {
        ReviewFilter {
            text: self.q.clone(),
            tags: self.tags.clone(),
            review_url,
        }
    }

    fn has_extra_criteria(&self) -> bool {
        self.q.is_some() || !self.tags.is_empty()
    }
}

/// 前导整数，范围 1..=100；无法解析时为 36
pub fn parse_limit(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return DEFAULT_LIMIT;
    };

    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return DEFAULT_LIMIT;
    }
    if negative {
        return 1;
    }

    digits[..end]
        .parse::<u64>()
        .unwrap_or(MAX_LIMIT)
        .clamp(1, MAX_LIMIT)
}

/// 去掉首尾各一个引号（粘贴链接时常带上）
fn strip_quotes(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

/// 临时记录 id：`tiktok:` + base64url 前 24 个字符
pub fn synthetic_id(normalized_url: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(normalized_url.as_bytes());
    let prefix: String = encoded.chars().take(24).collect();
    format!("tiktok:{}", prefix)
}

fn synthetic_review(normalized_url: &str, title: Option<String>, thumbnail: Option<String>) -> Review {
    Review {
        id: synthetic_id(normalized_url),
        title: title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| OEMBED_DEFAULT_TITLE.to_string()),
        platform: Platform::Tiktok,
        product_image: thumbnail.filter(|t| !t.is_empty()),
        product_gif: None,
        price: None,
        rating: None,
        tags: Vec::new(),
        aliases: Vec::new(),
        published_at: Utc::now(),
        review_url: normalized_url.to_string(),
        affiliate_url: String::new(),
        pros: Vec::new(),
        cons: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

/// TikTok 链接；解析失败或非 TikTok 时为 None
fn tiktok_lookup_url(raw: Option<&str>) -> Option<String> {
    let url = Url::parse(raw?).ok()?;
    tiktok::is_tiktok_host(&url).then(|| tiktok::normalize_tiktok_url(&url))
}

pub async fn search(
    storage: &SeaOrmStorage,
    oembed: &OEmbedClient,
    query: &SearchQuery,
) -> Result<SearchOutcome> {
    let Some(normalized) = tiktok_lookup_url(query.tiktok_url.as_deref()) else {
        let data = storage.find(&query.filter(None), query.limit).await?;
        return Ok(SearchOutcome {
            data,
            cache: CachePolicy::Normal,
        });
    };

    debug!("TikTok lookup for {}", normalized);
    let data = storage
        .find(&query.filter(Some(normalized.clone())), query.limit)
        .await?;

    if !data.is_empty() {
        return Ok(SearchOutcome {
            data,
            cache: CachePolicy::Normal,
        });
    }

    if query.has_extra_criteria() {
        return Ok(SearchOutcome {
            data,
            cache: CachePolicy::Short,
        });
    }

    Ok(match oembed.lookup(&normalized).await {
        Some(meta) => SearchOutcome {
            data: vec![synthetic_review(&normalized, meta.title, meta.thumbnail_url)],
            cache: CachePolicy::Normal,
        },
        None => SearchOutcome {
            data: Vec::new(),
            cache: CachePolicy::Short,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), 36);
        assert_eq!(parse_limit(Some("")), 36);
        assert_eq!(parse_limit(Some("abc")), 36);
        assert_eq!(parse_limit(Some("12")), 12);
        assert_eq!(parse_limit(Some("12abc")), 12);
        assert_eq!(parse_limit(Some("500")), 100);
        assert_eq!(parse_limit(Some("0")), 1);
        assert_eq!(parse_limit(Some("-5")), 1);
        assert_eq!(parse_limit(Some("99999999999999999999999")), 100);
    }

    #[test]
    fn test_query_from_params() {
        let q = SearchQuery::from_params(
            Some("  charger "),
            Some("usb-c,,anker,"),
            None,
            Some(" \"https://vt.tiktok.com/ZS1/\" "),
        );
        assert_eq!(q.q.as_deref(), Some("charger"));
        assert_eq!(q.tags, vec!["usb-c", "anker"]);
        assert_eq!(q.limit, 36);
        assert_eq!(q.tiktok_url.as_deref(), Some("https://vt.tiktok.com/ZS1/"));

        let q = SearchQuery::from_params(Some("   "), Some(""), Some("5"), Some("''"));
        assert_eq!(q, SearchQuery { limit: 5, ..Default::default() });
    }

    #[test]
    fn test_tiktok_lookup_url() {
        assert_eq!(
            tiktok_lookup_url(Some("https://www.tiktok.com/@a/video/1?sender_device=pc")).as_deref(),
            Some("https://www.tiktok.com/@a/video/1")
        );
        assert_eq!(tiktok_lookup_url(Some("https://youtube.com/watch?v=1")), None);
        assert_eq!(tiktok_lookup_url(Some("tiktok.com/@a")), None);
        assert_eq!(tiktok_lookup_url(None), None);
    }

    #[test]
    fn test_synthetic_id() {
        let id = synthetic_id("https://www.tiktok.com/@a/video/1");
        assert!(id.starts_with("tiktok:"));
        assert_eq!(id.len(), "tiktok:".len() + 24);
        assert!(!id.contains('+') && !id.contains('/') && !id.contains('='));
        assert_eq!(synthetic_id("ab"), "tiktok:YWI");
    }

    #[test]
    fn test_synthetic_review_defaults() {
        let r = synthetic_review("https://www.tiktok.com/@a/video/1", Some(String::new()), None);
        assert_eq!(r.title, "TikTok Video");
        assert_eq!(r.platform, Platform::Tiktok);
        assert!(r.tags.is_empty() && r.product_image.is_none());
        assert_eq!(r.affiliate_url, "");
    }
}
