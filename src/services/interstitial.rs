//! "在外部浏览器打开" 中间页
//!
//! in-app 浏览器打开 TikTok 优惠券页经常白屏，这里给出可点击的链接、
//! 可复制的原始地址，并在加载时尝试一次 `window.open`。

use super::link_resolver::Interstitial;

/// HTML 属性和文本转义
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<script>` 内的 JS 字符串字面量
pub fn js_string_literal(input: &str) -> String {
    serde_json::to_string(input)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

pub fn render(page: &Interstitial) -> String {
    let coupon_attr = escape_html(&page.coupon_url);
    let coupon_js = js_string_literal(&page.coupon_url);

    let secondary = match page.product_url.as_deref() {
        Some(url) => format!(
            r#"<a class="btn secondary" href="{}" target="_blank" rel="noopener">เปิดหน้าสินค้า / Open product page</a>"#,
            escape_html(url)
        ),
        None => r#"<a class="btn secondary disabled" aria-disabled="true" role="link">เปิดหน้าสินค้า / Open product page</a>"#
            .to_string(),
    };

    format!(
        r#"<!doctype html>
<html lang="th">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>เปิดในเบราว์เซอร์ / Open in browser</title>
<style>
body{{font-family:system-ui,-apple-system,sans-serif;margin:0;padding:24px;background:#fafafa;color:#111}}
main{{max-width:480px;margin:0 auto}}
h1{{font-size:20px}}
.btn{{display:block;text-align:center;padding:14px;border-radius:10px;margin:12px 0;text-decoration:none;font-weight:600}}
.primary{{background:#fe2c55;color:#fff}}
.secondary{{background:#fff;color:#111;border:1px solid #ddd}}
.disabled{{opacity:.45;pointer-events:none}}
code{{display:block;word-break:break-all;background:#fff;border:1px solid #eee;padding:10px;border-radius:8px;font-size:13px}}
</style>
</head>
<body>
<main>
<h1>แอปนี้เปิดคูปองไม่ได้ / This app can't open the coupon</h1>
<p>กดปุ่มด้านล่าง หรือเลือก "เปิดในเบราว์เซอร์" จากเมนู ⋯</p>
<a class="btn primary" href="{coupon_attr}" target="_blank" rel="noopener">เปิดคูปอง / Open coupon</a>
{secondary}
<p>หรือคัดลอกลิงก์นี้ / Or copy this link:</p>
<code>{coupon_attr}</code>
</main>
<script>
(function(){{try{{window.open({coupon_js},"_blank");}}catch(e){{}}}})();
</script>
</body>
</html>
"#
    )
}
