//! TikTok URL helpers
//!
//! - host detection
//! - tracking / nav-bar parameter cleanup
//! - land page rewrite
//! - coupon page and product id extraction

use url::Url;

/// 分享链接带的追踪参数，入库前去掉
pub const TRACKING_PARAMS: &[&str] = &[
    "is_from_webapp",
    "sender_device",
    "sender_web_id",
    "utm_source",
    "utm_medium",
    "utm_campaign",
];

/// 强制隐藏导航栏/状态栏的参数，会导致 in-app 浏览器渲染异常
pub const NAV_PARAMS: &[&str] = &["hide_nav_bar", "hide_status_bar", "trans_status_bar"];

pub const LAND_PAGE_PARAM: &str = "use_land_page";

const PRODUCT_PAGE_BASE: &str = "https://www.tiktok.com/view/product/";

/// `tiktok.com` 或其子域名（不区分大小写）
pub fn is_tiktok_host(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            host == "tiktok.com" || host.ends_with(".tiktok.com")
        }
        None => false,
    }
}

/// 去掉指定的查询参数
///
/// 查询串总是按表单编码重新序列化，同一链接的不同编码得到同一结果。
pub fn remove_query_params(url: &mut Url, keys: &[&str]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !keys.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    set_query_pairs(url, &kept);
}

fn set_query_pairs(url: &mut Url, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// 去掉追踪参数后的规范化 TikTok 链接
pub fn normalize_tiktok_url(url: &Url) -> String {
    let mut url = url.clone();
    remove_query_params(&mut url, TRACKING_PARAMS);
    url.to_string()
}

/// 解析并规范化：非 TikTok 链接原样返回，无法解析时返回 None
pub fn normalize_review_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if is_tiktok_host(&url) {
        Some(normalize_tiktok_url(&url))
    } else {
        Some(raw.to_string())
    }
}

/// 强制 `use_land_page=1` 并去掉导航栏参数
///
/// 已有的 `use_land_page` 原位改写，重复项删除；没有时追加到末尾。
pub fn apply_land_page(url: &mut Url) {
    let mut seen = false;
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (k, v) in url.query_pairs() {
        if NAV_PARAMS.contains(&k.as_ref()) {
            continue;
        }
        if k == LAND_PAGE_PARAM {
            if !seen {
                seen = true;
                pairs.push((k.into_owned(), "1".to_string()));
            }
            continue;
        }
        pairs.push((k.into_owned(), v.into_owned()));
    }

    if !seen {
        pairs.push((LAND_PAGE_PARAM.to_string(), "1".to_string()));
    }

    set_query_pairs(url, &pairs);
}

/// 路径中包含 `voucher` 或 `linkshare`（含 `voucher.html`）
pub fn is_coupon_path(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    path.contains("voucher") || path.contains("linkshare")
}

fn first_query_value(url: &Url, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        url.query_pairs()
            .find(|(k, v)| k == *key && !v.is_empty())
            .map(|(_, v)| v.into_owned())
    })
}

/// `product_id` 优先，其次 `productId`
pub fn product_id(url: &Url) -> Option<String> {
    first_query_value(url, &["product_id", "productId"])
}

pub fn chain_key(url: &Url) -> Option<String> {
    first_query_value(url, &["chain_key"])
}

/// 商品详情页链接
pub fn product_page_url(product_id: &str, chain_key: Option<&str>) -> String {
    let base = format!(
        "{}{}",
        PRODUCT_PAGE_BASE,
        urlencoding::encode(product_id)
    );

    match Url::parse(&base) {
        Ok(mut url) => {
            {
                let mut q = url.query_pairs_mut();
                q.append_pair("scene", "pdp").append_pair(LAND_PAGE_PARAM, "1");
                if let Some(key) = chain_key {
                    q.append_pair("chain_key", key);
                }
            }
            url.to_string()
        }
        // 编码后的 id 总能拼出合法 URL，这里只是兜底
        Err(_) => format!("{}?scene=pdp&{}=1", base, LAND_PAGE_PARAM),
    }
}
