//! `/go` 出站链接决策
//!
//! 输入是 `u` 参数和 User-Agent，输出是 302 跳转或 interstitial 页面。
//! 纯函数，不做 IO。

use url::Url;

use super::tiktok;

/// 已知 in-app 浏览器的 UA 特征（小写子串）
pub const IN_APP_SIGNATURES: &[&str] = &[
    // TikTok / 抖音
    "bytedancewebview",
    "musical_ly",
    "tiktok",
    "trill",
    // Instagram
    "instagram",
    // Facebook
    "fban",
    "fbav",
    "fb_iab",
    "fbios",
    // LINE
    "line/",
    // Twitter / X
    "twitter",
];

/// 跳回首页的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    MissingTarget,
    UnparseableUrl(String),
    DisallowedScheme(String),
}

impl std::fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "missing target"),
            Self::UnparseableUrl(e) => write!(f, "unparseable url: {}", e),
            Self::DisallowedScheme(s) => write!(f, "disallowed scheme: {}", s),
        }
    }
}

/// interstitial 页面需要的数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interstitial {
    /// 改写后的优惠券链接
    pub coupon_url: String,
    /// 商品详情页，没有商品 id 时为 None
    pub product_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect(String),
    Interstitial(Interstitial),
    /// 跳回 `/`
    Home(ResolveFailure),
}

impl Resolution {
    /// 302 的 Location；interstitial 返回 None
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect(url) => Some(url),
            Self::Home(_) => Some("/"),
            Self::Interstitial(_) => None,
        }
    }
}

/// UA 子串匹配，不区分大小写
#[derive(Debug, Clone)]
pub struct InAppDetector {
    signatures: Vec<String>,
}

impl InAppDetector {
    pub fn new(extra: &[String]) -> Self {
        let mut signatures: Vec<String> = IN_APP_SIGNATURES.iter().map(|s| s.to_string()).collect();
        for sig in extra {
            let sig = sig.trim().to_lowercase();
            if !sig.is_empty() && !signatures.contains(&sig) {
                signatures.push(sig);
            }
        }
        Self { signatures }
    }

    pub fn is_in_app(&self, user_agent: &str) -> bool {
        if user_agent.is_empty() {
            return false;
        }
        let ua = user_agent.to_lowercase();
        self.signatures.iter().any(|sig| ua.contains(sig.as_str()))
    }
}

impl Default for InAppDetector {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    detector: InAppDetector,
}

impl LinkResolver {
    pub fn new(extra_in_app_signatures: &[String]) -> Self {
        Self {
            detector: InAppDetector::new(extra_in_app_signatures),
        }
    }

    pub fn resolve(&self, target: Option<&str>, user_agent: &str) -> Resolution {
        let raw = match target {
            Some(t) if !t.is_empty() => t,
            _ => return Resolution::Home(ResolveFailure::MissingTarget),
        };

        let mut dest = match normalize_target(raw) {
            Ok(url) => url,
            Err(failure) => return Resolution::Home(failure),
        };

        if !tiktok::is_tiktok_host(&dest) {
            return Resolution::Redirect(dest.into());
        }

        tiktok::apply_land_page(&mut dest);

        if tiktok::is_coupon_path(&dest) && self.detector.is_in_app(user_agent) {
            let product_url = tiktok::product_id(&dest).map(|id| {
                let chain_key = tiktok::chain_key(&dest);
                tiktok::product_page_url(&id, chain_key.as_deref())
            });
            return Resolution::Interstitial(Interstitial {
                coupon_url: dest.into(),
                product_url,
            });
        }

        Resolution::Redirect(dest.into())
    }
}

/// 解码、补全 scheme、解析，只接受 http/https
///
/// `raw` 已经被查询串解析解码过一次。只有解码后才像绝对地址时
/// （双重编码的链接）才再解码一次，否则目标里内嵌的编码值保持原样。
pub fn normalize_target(raw: &str) -> Result<Url, ResolveFailure> {
    let decoded = decode_double_encoded(raw.trim());

    let trimmed = decoded.trim();
    let href = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };

    let url = Url::parse(&href).map_err(|e| ResolveFailure::UnparseableUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ResolveFailure::DisallowedScheme(other.to_string())),
    }
}

fn decode_double_encoded(target: &str) -> String {
    if looks_absolute(target) {
        return target.to_string();
    }
    match percent_decode(target) {
        Some(decoded) if looks_absolute(decoded.trim()) => decoded,
        Some(_) => target.to_string(),
        None => {
            tracing::debug!("target is not valid percent-encoding, using it verbatim");
            target.to_string()
        }
    }
}

/// `http://`、`https://` 或 `//` 开头
fn looks_absolute(s: &str) -> bool {
    has_http_scheme(s) || s.starts_with("//")
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 严格的百分号解码：`%` 后必须是两位十六进制，且结果是 UTF-8
fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IN_APP_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 musical_ly_32.5.0 BytedanceWebview/d8a21c6";
    const SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    fn resolver() -> LinkResolver {
        LinkResolver::default()
    }

    #[test]
    fn test_missing_target_goes_home() {
        assert_eq!(
            resolver().resolve(None, SAFARI_UA),
            Resolution::Home(ResolveFailure::MissingTarget)
        );
        assert_eq!(resolver().resolve(Some(""), SAFARI_UA).location(), Some("/"));
    }

    #[test]
    fn test_schemeless_target_gets_https() {
        let r = resolver().resolve(Some("//example.com/path?a=1"), SAFARI_UA);
        assert_eq!(r, Resolution::Redirect("https://example.com/path?a=1".to_string()));
    }

    #[test]
    fn test_percent_encoded_target_is_decoded() {
        let r = resolver().resolve(Some("https%3A%2F%2Fexample.com%2Fa%3Fb%3D1"), SAFARI_UA);
        assert_eq!(r.location(), Some("https://example.com/a?b=1"));
    }

    #[test]
    fn test_embedded_encoded_url_is_not_decoded_again() {
        let target = "https://s.shopee.co.th/an_redir?origin_link=https%3A%2F%2Fshopee.co.th%2Fp%3Fa%3D1%26b%3D2&affiliate_id=9";
        assert_eq!(resolver().resolve(Some(target), SAFARI_UA).location(), Some(target));

        let r = resolver().resolve(Some("example.com/a%20b"), SAFARI_UA);
        assert_eq!(r.location(), Some("https://example.com/a%20b"));
    }

    #[test]
    fn test_malformed_escape_is_kept_verbatim() {
        assert_eq!(percent_decode("100%"), None);
        let r = resolver().resolve(Some("example.com/100%zz"), SAFARI_UA);
        assert!(matches!(r, Resolution::Redirect(ref u) if u.starts_with("https://example.com/100")));
    }

    #[test]
    fn test_garbage_goes_home() {
        let r = resolver().resolve(Some("http://"), SAFARI_UA);
        assert!(matches!(r, Resolution::Home(ResolveFailure::UnparseableUrl(_))));
    }

    #[test]
    fn test_non_http_scheme_never_escapes() {
        // javascript: 会被当成主机名补上 https://，解析失败
        let r = resolver().resolve(Some("javascript:alert(1)"), SAFARI_UA);
        assert_eq!(r.location(), Some("/"));
    }

    #[test]
    fn test_non_tiktok_is_untouched() {
        let r = resolver().resolve(Some("https://shopee.co.th/item?hide_nav_bar=1"), IN_APP_UA);
        assert_eq!(
            r,
            Resolution::Redirect("https://shopee.co.th/item?hide_nav_bar=1".to_string())
        );
    }

    #[test]
    fn test_tiktok_non_coupon_is_rewritten() {
        let r = resolver().resolve(
            Some("https://www.tiktok.com/@shop/video/1?hide_nav_bar=1"),
            IN_APP_UA,
        );
        assert_eq!(
            r.location(),
            Some("https://www.tiktok.com/@shop/video/1?use_land_page=1")
        );
    }

    #[test]
    fn test_tiktok_coupon_in_regular_browser_redirects() {
        let r = resolver().resolve(
            Some("https://vt.tiktok.com/view/voucher.html?code=X"),
            SAFARI_UA,
        );
        assert_eq!(
            r.location(),
            Some("https://vt.tiktok.com/view/voucher.html?code=X&use_land_page=1")
        );
    }

    #[test]
    fn test_tiktok_coupon_in_app_renders_interstitial() {
        let r = resolver().resolve(
            Some("https://www.tiktok.com/linkshare/x?product_id=123&trans_status_bar=1"),
            IN_APP_UA,
        );
        assert_eq!(
            r,
            Resolution::Interstitial(Interstitial {
                coupon_url: "https://www.tiktok.com/linkshare/x?product_id=123&use_land_page=1"
                    .to_string(),
                product_url: Some(
                    "https://www.tiktok.com/view/product/123?scene=pdp&use_land_page=1".to_string()
                ),
            })
        );
    }

    #[test]
    fn test_interstitial_carries_chain_key() {
        let r = resolver().resolve(
            Some("https://www.tiktok.com/voucher?productId=55&chain_key=abc"),
            "Instagram 300.0.0.0 (iPhone13,2)",
        );
        match r {
            Resolution::Interstitial(page) => assert_eq!(
                page.product_url.as_deref(),
                Some("https://www.tiktok.com/view/product/55?scene=pdp&use_land_page=1&chain_key=abc")
            ),
            other => panic!("expected interstitial, got {:?}", other),
        }
    }

    #[test]
    fn test_interstitial_without_product_id() {
        let r = resolver().resolve(Some("https://www.tiktok.com/voucher.html"), "Line/13.1.0");
        assert!(matches!(r, Resolution::Interstitial(Interstitial { product_url: None, .. })));
    }

    #[test]
    fn test_detector_signatures() {
        let d = InAppDetector::default();
        assert!(d.is_in_app("Mozilla/5.0 [FBAN/FBIOS;FBAV/450.0]"));
        assert!(d.is_in_app("Mozilla/5.0 TwitterAndroid"));
        assert!(!d.is_in_app(SAFARI_UA));
        assert!(!d.is_in_app(""));

        let d = InAppDetector::new(&["  KAKAOTALK ".to_string(), "".to_string()]);
        assert!(d.is_in_app("Mozilla/5.0 KAKAOTALK 10.4.5"));
    }
}
